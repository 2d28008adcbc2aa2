//! Generic labelled tree built from the SQL syntax tree
//!
//! Every dumper walks this one shape, so adding an output style never touches
//! the AST. Lowering keeps the structure of the statement: clauses become
//! interior nodes, operators own their operands, names and literals are leaves.

use crate::parser::ast::*;

/// A node with a display label and ordered children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub label: String,
    pub children: Vec<Node>,
}

impl Node {
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    pub fn branch(label: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, including itself
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(Node::size).sum::<usize>()
    }
}

/// Conversion of syntax tree values into [`Node`]s
pub trait ToTree {
    fn to_tree(&self) -> Node;
}

/// Root node holding every statement of one parse
pub fn statements_tree(statements: &[Statement]) -> Node {
    Node::branch("statements", statements.iter().map(ToTree::to_tree).collect())
}

fn clause(label: &str, children: Vec<Node>) -> Option<Node> {
    if children.is_empty() {
        None
    } else {
        Some(Node::branch(label, children))
    }
}

fn aliased(node: Node, alias: &Option<String>) -> Node {
    match alias {
        Some(alias) => Node::branch(format!("AS {}", alias), vec![node]),
        None => node,
    }
}

impl ToTree for Statement {
    fn to_tree(&self) -> Node {
        match self {
            Statement::Select(select) => select.to_tree(),
            Statement::Insert(insert) => insert.to_tree(),
            Statement::Update(update) => update.to_tree(),
            Statement::Delete(delete) => delete.to_tree(),
            Statement::CreateTable(create) => create.to_tree(),
            Statement::DropTable(drop) => drop.to_tree(),
        }
    }
}

// ============================================================================
// SELECT
// ============================================================================

impl ToTree for SelectStatement {
    fn to_tree(&self) -> Node {
        let label = if self.distinct { "SELECT DISTINCT" } else { "SELECT" };

        let mut children = Vec::new();
        children.extend(clause(
            "columns",
            self.projection.iter().map(ToTree::to_tree).collect(),
        ));
        children.extend(clause("FROM", self.from.iter().map(ToTree::to_tree).collect()));
        if let Some(selection) = &self.selection {
            children.push(Node::branch("WHERE", vec![selection.to_tree()]));
        }
        children.extend(clause(
            "GROUP BY",
            self.group_by.iter().map(ToTree::to_tree).collect(),
        ));
        if let Some(having) = &self.having {
            children.push(Node::branch("HAVING", vec![having.to_tree()]));
        }
        children.extend(clause(
            "ORDER BY",
            self.order_by.iter().map(ToTree::to_tree).collect(),
        ));
        if let Some(limit) = &self.limit {
            let mut parts = vec![limit.count.to_tree()];
            if let Some(offset) = &limit.offset {
                parts.push(Node::branch("OFFSET", vec![offset.to_tree()]));
            }
            children.push(Node::branch("LIMIT", parts));
        }

        Node::branch(label, children)
    }
}

impl ToTree for SelectItem {
    fn to_tree(&self) -> Node {
        match self {
            SelectItem::Wildcard => Node::leaf("*"),
            SelectItem::QualifiedWildcard(qualifier) => Node::leaf(format!("{}.*", qualifier)),
            SelectItem::Expr { expr, alias } => aliased(expr.to_tree(), alias),
        }
    }
}

impl ToTree for TableRef {
    /// Joins nest to the left: `a JOIN b JOIN c` becomes `JOIN(JOIN(a, b), c)`
    fn to_tree(&self) -> Node {
        self.joins
            .iter()
            .fold(self.factor.to_tree(), |left, join| {
                let mut children = vec![left, join.factor.to_tree()];
                if let Some(on) = &join.on {
                    children.push(Node::branch("ON", vec![on.to_tree()]));
                }
                Node::branch(join.kind.to_string(), children)
            })
    }
}

impl ToTree for TableFactor {
    fn to_tree(&self) -> Node {
        match self {
            TableFactor::Table { name, alias } => aliased(Node::leaf(name.to_string()), alias),
            TableFactor::Derived { subquery, alias } => aliased(subquery.to_tree(), alias),
        }
    }
}

impl ToTree for OrderItem {
    fn to_tree(&self) -> Node {
        match self.direction {
            Some(direction) => Node::branch(direction.to_string(), vec![self.expr.to_tree()]),
            None => self.expr.to_tree(),
        }
    }
}

// ============================================================================
// INSERT / UPDATE / DELETE
// ============================================================================

impl ToTree for InsertStatement {
    fn to_tree(&self) -> Node {
        let mut children = Vec::new();
        children.extend(clause(
            "columns",
            self.columns.iter().map(|c| Node::leaf(c.as_str())).collect(),
        ));
        match &self.source {
            InsertSource::Values(rows) => {
                let rows = rows
                    .iter()
                    .map(|row| Node::branch("row", row.iter().map(ToTree::to_tree).collect()))
                    .collect();
                children.push(Node::branch("VALUES", rows));
            }
            InsertSource::Select(select) => children.push(select.to_tree()),
        }

        Node::branch(format!("INSERT INTO {}", self.table), children)
    }
}

impl ToTree for UpdateStatement {
    fn to_tree(&self) -> Node {
        let assignments = self
            .assignments
            .iter()
            .map(|a| Node::branch("=", vec![Node::leaf(a.column.as_str()), a.value.to_tree()]))
            .collect();

        let mut children = vec![Node::branch("SET", assignments)];
        if let Some(selection) = &self.selection {
            children.push(Node::branch("WHERE", vec![selection.to_tree()]));
        }

        Node::branch(format!("UPDATE {}", self.table), children)
    }
}

impl ToTree for DeleteStatement {
    fn to_tree(&self) -> Node {
        let children = self
            .selection
            .iter()
            .map(|selection| Node::branch("WHERE", vec![selection.to_tree()]))
            .collect();

        Node::branch(format!("DELETE FROM {}", self.table), children)
    }
}

// ============================================================================
// DDL
// ============================================================================

impl ToTree for CreateTableStatement {
    fn to_tree(&self) -> Node {
        let label = if self.if_not_exists {
            format!("CREATE TABLE IF NOT EXISTS {}", self.name)
        } else {
            format!("CREATE TABLE {}", self.name)
        };

        Node::branch(label, self.columns.iter().map(ToTree::to_tree).collect())
    }
}

impl ToTree for ColumnDef {
    fn to_tree(&self) -> Node {
        let constraints = self
            .constraints
            .iter()
            .map(|constraint| match constraint {
                ColumnConstraint::NotNull => Node::leaf("NOT NULL"),
                ColumnConstraint::Null => Node::leaf("NULL"),
                ColumnConstraint::PrimaryKey => Node::leaf("PRIMARY KEY"),
                ColumnConstraint::Unique => Node::leaf("UNIQUE"),
                ColumnConstraint::Default(expr) => Node::branch("DEFAULT", vec![expr.to_tree()]),
            })
            .collect();

        Node::branch(format!("{} {}", self.name, self.data_type), constraints)
    }
}

impl ToTree for DropTableStatement {
    fn to_tree(&self) -> Node {
        if self.if_exists {
            Node::leaf(format!("DROP TABLE IF EXISTS {}", self.name))
        } else {
            Node::leaf(format!("DROP TABLE {}", self.name))
        }
    }
}

// ============================================================================
// Expressions
// ============================================================================

impl ToTree for Expr {
    fn to_tree(&self) -> Node {
        match self {
            Expr::Column(name) => Node::leaf(name.to_string()),
            Expr::Literal(literal) => Node::leaf(literal.to_string()),
            Expr::Unary { op, expr } => Node::branch(op.to_string(), vec![expr.to_tree()]),
            Expr::Binary { left, op, right } => {
                Node::branch(op.to_string(), vec![left.to_tree(), right.to_tree()])
            }
            Expr::IsNull { expr, negated } => {
                let label = if *negated { "IS NOT NULL" } else { "IS NULL" };
                Node::branch(label, vec![expr.to_tree()])
            }
            Expr::InList { expr, list, negated } => {
                let label = if *negated { "NOT IN" } else { "IN" };
                let mut children = vec![expr.to_tree()];
                children.push(Node::branch("list", list.iter().map(ToTree::to_tree).collect()));
                Node::branch(label, children)
            }
            Expr::InSubquery {
                expr,
                subquery,
                negated,
            } => {
                let label = if *negated { "NOT IN" } else { "IN" };
                Node::branch(label, vec![expr.to_tree(), subquery.to_tree()])
            }
            Expr::Between {
                expr,
                low,
                high,
                negated,
            } => {
                let label = if *negated { "NOT BETWEEN" } else { "BETWEEN" };
                Node::branch(label, vec![expr.to_tree(), low.to_tree(), high.to_tree()])
            }
            Expr::Function {
                name,
                distinct,
                args,
            } => {
                let label = if *distinct {
                    format!("{}(DISTINCT)", name)
                } else {
                    format!("{}()", name)
                };
                let children = match args {
                    FunctionArgs::Star => vec![Node::leaf("*")],
                    FunctionArgs::List(args) => args.iter().map(ToTree::to_tree).collect(),
                };
                Node::branch(label, children)
            }
            Expr::Exists(subquery) => Node::branch("EXISTS", vec![subquery.to_tree()]),
            Expr::Subquery(subquery) => subquery.to_tree(),
        }
    }
}
