//! Pest grammar parser for SQL statements

use std::sync::OnceLock;

use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest_derive::Parser;

use crate::error::{Result, SqlError};
use crate::parser::ast::*;

#[derive(Parser)]
#[grammar = "../grammar/sql.pest"]
pub struct SqlParser;

/// Operator precedence, loosest first
fn pratt() -> &'static PrattParser<Rule> {
    static PRATT: OnceLock<PrattParser<Rule>> = OnceLock::new();
    PRATT.get_or_init(|| {
        PrattParser::new()
            .op(Op::infix(Rule::or_op, Assoc::Left))
            .op(Op::infix(Rule::and_op, Assoc::Left))
            .op(Op::prefix(Rule::not_op))
            .op(Op::infix(Rule::eq, Assoc::Left)
                | Op::infix(Rule::neq, Assoc::Left)
                | Op::infix(Rule::lt, Assoc::Left)
                | Op::infix(Rule::le, Assoc::Left)
                | Op::infix(Rule::gt, Assoc::Left)
                | Op::infix(Rule::ge, Assoc::Left)
                | Op::infix(Rule::like, Assoc::Left)
                | Op::infix(Rule::not_like, Assoc::Left)
                | Op::postfix(Rule::is_null)
                | Op::postfix(Rule::is_not_null)
                | Op::postfix(Rule::in_list)
                | Op::postfix(Rule::not_in_list)
                | Op::postfix(Rule::between)
                | Op::postfix(Rule::not_between))
            .op(Op::infix(Rule::concat, Assoc::Left))
            .op(Op::infix(Rule::add, Assoc::Left) | Op::infix(Rule::sub, Assoc::Left))
            .op(Op::infix(Rule::mul, Assoc::Left)
                | Op::infix(Rule::div, Assoc::Left)
                | Op::infix(Rule::modulo, Assoc::Left))
            .op(Op::prefix(Rule::neg))
    })
}

/// Human readable rule names for parser error messages
pub fn describe_rule(rule: &Rule) -> String {
    let name = match rule {
        Rule::EOI => "end of input",
        Rule::statement => "statement",
        Rule::expr | Rule::bound => "expression",
        Rule::qualified_name => "table name",
        Rule::identifier => "identifier",
        Rule::data_type | Rule::type_name => "column type",
        Rule::or_op => "OR",
        Rule::and_op => "AND",
        Rule::not_op => "NOT",
        Rule::eq => "'='",
        Rule::neq => "'<>'",
        Rule::lt => "'<'",
        Rule::le => "'<='",
        Rule::gt => "'>'",
        Rule::ge => "'>='",
        Rule::like => "LIKE",
        Rule::not_like => "NOT LIKE",
        Rule::concat => "'||'",
        Rule::add => "'+'",
        Rule::sub | Rule::neg => "'-'",
        Rule::mul | Rule::wildcard | Rule::star_arg => "'*'",
        Rule::div => "'/'",
        Rule::modulo => "'%'",
        _ => {
            let name = format!("{:?}", rule);
            return match name.strip_prefix("KW_") {
                Some(keyword) => keyword.to_string(),
                None => name.replace('_', " "),
            };
        }
    };
    name.to_string()
}

fn is_operator(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::not_op
            | Rule::neg
            | Rule::or_op
            | Rule::and_op
            | Rule::eq
            | Rule::neq
            | Rule::lt
            | Rule::le
            | Rule::gt
            | Rule::ge
            | Rule::like
            | Rule::not_like
            | Rule::concat
            | Rule::add
            | Rule::sub
            | Rule::mul
            | Rule::div
            | Rule::modulo
            | Rule::is_null
            | Rule::is_not_null
            | Rule::in_list
            | Rule::not_in_list
            | Rule::between
            | Rule::not_between
    )
}

/// Upper bound on how deep the syntax tree built from `pairs` can get
///
/// Every pair adds one level. An operator chain such as `a + b + c` is flat
/// in the parse tree but nests once per operator in the syntax tree, so each
/// expression also adds its operator count. The walk keeps its own stack and
/// is safe on arbitrarily deep input.
pub fn nesting_depth(pairs: Pairs<Rule>) -> usize {
    let mut deepest = 0;
    let mut pending: Vec<(Pair<Rule>, usize)> = pairs.map(|pair| (pair, 1)).collect();

    while let Some((pair, depth)) = pending.pop() {
        let depth = match pair.as_rule() {
            Rule::expr | Rule::bound => {
                depth + pair.clone().into_inner().filter(|p| is_operator(p.as_rule())).count()
            }
            _ => depth,
        };
        deepest = deepest.max(depth);
        pending.extend(pair.into_inner().map(|child| (child, depth + 1)));
    }

    deepest
}

// ============================================================================
// Tree walking helpers
// ============================================================================

fn unexpected(pair: &Pair<Rule>) -> SqlError {
    let (line, col) = pair.as_span().start_pos().line_col();
    SqlError::Engine(format!(
        "Unexpected rule {:?} at line {}, column {}",
        pair.as_rule(),
        line,
        col
    ))
}

fn missing(what: &str) -> SqlError {
    SqlError::Engine(format!("Expected {} in parse tree", what))
}

fn first_inner<'i>(pair: Pair<'i, Rule>, what: &str) -> Result<Pair<'i, Rule>> {
    pair.into_inner().next().ok_or_else(|| missing(what))
}

/// Strips the quotes of a `"quoted identifier"`
fn identifier(pair: &Pair<Rule>) -> String {
    let raw = pair.as_str();
    raw.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw)
        .to_string()
}

fn object_name(pair: Pair<Rule>) -> ObjectName {
    ObjectName(
        pair.into_inner()
            .filter(|p| p.as_rule() == Rule::identifier)
            .map(|p| identifier(&p))
            .collect(),
    )
}

fn alias(pair: Pair<Rule>) -> Result<String> {
    pair.into_inner()
        .find(|p| p.as_rule() == Rule::identifier)
        .map(|p| identifier(&p))
        .ok_or_else(|| missing("alias name"))
}

/// The single expression of a clause such as WHERE or ON
fn child_expr(pair: Pair<Rule>) -> Result<Expr> {
    pair.into_inner()
        .find(|p| p.as_rule() == Rule::expr)
        .ok_or_else(|| missing("expression"))
        .and_then(build_expr)
}

fn child_exprs(pair: Pair<Rule>) -> Result<Vec<Expr>> {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::expr)
        .map(build_expr)
        .collect()
}

// ============================================================================
// Statements
// ============================================================================

/// Build the statement list from the pairs of a successful `statements` parse
pub fn build_statements(mut pairs: Pairs<Rule>) -> Result<Vec<Statement>> {
    let root = pairs.next().ok_or_else(|| missing("statement list"))?;

    root.into_inner()
        .filter(|p| p.as_rule() == Rule::statement)
        .map(build_statement)
        .collect()
}

fn build_statement(pair: Pair<Rule>) -> Result<Statement> {
    let inner = first_inner(pair, "statement body")?;

    match inner.as_rule() {
        Rule::select_stmt => Ok(Statement::Select(Box::new(build_select(inner)?))),
        Rule::insert_stmt => Ok(Statement::Insert(build_insert(inner)?)),
        Rule::update_stmt => Ok(Statement::Update(build_update(inner)?)),
        Rule::delete_stmt => Ok(Statement::Delete(build_delete(inner)?)),
        Rule::create_table_stmt => Ok(Statement::CreateTable(build_create_table(inner)?)),
        Rule::drop_table_stmt => Ok(Statement::DropTable(build_drop_table(inner)?)),
        _ => Err(unexpected(&inner)),
    }
}

// ============================================================================
// SELECT
// ============================================================================

fn build_select(pair: Pair<Rule>) -> Result<SelectStatement> {
    let mut select = SelectStatement::default();

    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::KW_SELECT => {}
            Rule::set_quantifier => {
                let quantifier = first_inner(item, "DISTINCT or ALL")?;
                select.distinct = quantifier.as_rule() == Rule::KW_DISTINCT;
            }
            Rule::select_list => {
                select.projection = item
                    .into_inner()
                    .map(build_select_item)
                    .collect::<Result<_>>()?;
            }
            Rule::from_clause => {
                select.from = item
                    .into_inner()
                    .filter(|p| p.as_rule() == Rule::table_ref)
                    .map(build_table_ref)
                    .collect::<Result<_>>()?;
            }
            Rule::where_clause => select.selection = Some(child_expr(item)?),
            Rule::group_by_clause => select.group_by = child_exprs(item)?,
            Rule::having_clause => select.having = Some(child_expr(item)?),
            Rule::order_by_clause => {
                select.order_by = item
                    .into_inner()
                    .filter(|p| p.as_rule() == Rule::order_item)
                    .map(build_order_item)
                    .collect::<Result<_>>()?;
            }
            Rule::limit_clause => select.limit = Some(build_limit(item)?),
            _ => return Err(unexpected(&item)),
        }
    }

    Ok(select)
}

fn build_select_item(pair: Pair<Rule>) -> Result<SelectItem> {
    let inner = first_inner(pair, "select item")?;

    match inner.as_rule() {
        Rule::wildcard => Ok(SelectItem::Wildcard),
        Rule::qualified_wildcard => {
            let qualifier = first_inner(inner, "wildcard qualifier")?;
            Ok(SelectItem::QualifiedWildcard(identifier(&qualifier)))
        }
        Rule::aliased_expr => {
            let mut expr = None;
            let mut name = None;
            for part in inner.into_inner() {
                match part.as_rule() {
                    Rule::expr => expr = Some(build_expr(part)?),
                    Rule::alias => name = Some(alias(part)?),
                    _ => return Err(unexpected(&part)),
                }
            }
            Ok(SelectItem::Expr {
                expr: expr.ok_or_else(|| missing("select expression"))?,
                alias: name,
            })
        }
        _ => Err(unexpected(&inner)),
    }
}

fn build_table_ref(pair: Pair<Rule>) -> Result<TableRef> {
    let mut inner = pair.into_inner();
    let factor = build_table_factor(inner.next().ok_or_else(|| missing("table"))?)?;
    let joins = inner.map(build_join).collect::<Result<_>>()?;

    Ok(TableRef { factor, joins })
}

fn build_table_factor(pair: Pair<Rule>) -> Result<TableFactor> {
    let mut name = None;
    let mut subquery = None;
    let mut table_alias = None;

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::qualified_name => name = Some(object_name(part)),
            Rule::subquery => subquery = Some(build_subquery(part)?),
            Rule::alias => table_alias = Some(alias(part)?),
            _ => return Err(unexpected(&part)),
        }
    }

    match (name, subquery) {
        (Some(name), _) => Ok(TableFactor::Table {
            name,
            alias: table_alias,
        }),
        (None, Some(subquery)) => Ok(TableFactor::Derived {
            subquery: Box::new(subquery),
            alias: table_alias,
        }),
        (None, None) => Err(missing("table name or subquery")),
    }
}

fn build_join(pair: Pair<Rule>) -> Result<Join> {
    let mut kind = JoinKind::Inner;
    let mut factor = None;
    let mut on = None;

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::KW_JOIN => {}
            Rule::join_kind => {
                let keyword = first_inner(part, "join kind")?;
                kind = match keyword.as_rule() {
                    Rule::KW_INNER => JoinKind::Inner,
                    Rule::KW_LEFT => JoinKind::Left,
                    Rule::KW_RIGHT => JoinKind::Right,
                    Rule::KW_FULL => JoinKind::Full,
                    Rule::KW_CROSS => JoinKind::Cross,
                    _ => return Err(unexpected(&keyword)),
                };
            }
            Rule::table_factor => factor = Some(build_table_factor(part)?),
            Rule::join_condition => on = Some(child_expr(part)?),
            _ => return Err(unexpected(&part)),
        }
    }

    Ok(Join {
        kind,
        factor: factor.ok_or_else(|| missing("joined table"))?,
        on,
    })
}

fn build_order_item(pair: Pair<Rule>) -> Result<OrderItem> {
    let mut expr = None;
    let mut direction = None;

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::expr => expr = Some(build_expr(part)?),
            Rule::KW_ASC => direction = Some(SortDirection::Asc),
            Rule::KW_DESC => direction = Some(SortDirection::Desc),
            _ => return Err(unexpected(&part)),
        }
    }

    Ok(OrderItem {
        expr: expr.ok_or_else(|| missing("ORDER BY expression"))?,
        direction,
    })
}

fn build_limit(pair: Pair<Rule>) -> Result<Limit> {
    let mut count = None;
    let mut offset = None;

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::KW_LIMIT => {}
            Rule::expr => count = Some(build_expr(part)?),
            Rule::offset_clause => offset = Some(child_expr(part)?),
            _ => return Err(unexpected(&part)),
        }
    }

    Ok(Limit {
        count: count.ok_or_else(|| missing("LIMIT count"))?,
        offset,
    })
}

fn build_subquery(pair: Pair<Rule>) -> Result<SelectStatement> {
    build_select(first_inner(pair, "subquery")?)
}

// ============================================================================
// INSERT / UPDATE / DELETE
// ============================================================================

fn build_insert(pair: Pair<Rule>) -> Result<InsertStatement> {
    let mut table = None;
    let mut columns = Vec::new();
    let mut source = None;

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::KW_INSERT | Rule::KW_INTO => {}
            Rule::qualified_name => table = Some(object_name(part)),
            Rule::column_list => {
                columns = part.into_inner().map(|p| identifier(&p)).collect();
            }
            Rule::values_clause => {
                let rows = part
                    .into_inner()
                    .filter(|p| p.as_rule() == Rule::row)
                    .map(child_exprs)
                    .collect::<Result<_>>()?;
                source = Some(InsertSource::Values(rows));
            }
            Rule::select_stmt => {
                source = Some(InsertSource::Select(Box::new(build_select(part)?)));
            }
            _ => return Err(unexpected(&part)),
        }
    }

    Ok(InsertStatement {
        table: table.ok_or_else(|| missing("INSERT target"))?,
        columns,
        source: source.ok_or_else(|| missing("INSERT source"))?,
    })
}

fn build_update(pair: Pair<Rule>) -> Result<UpdateStatement> {
    let mut table = None;
    let mut assignments = Vec::new();
    let mut selection = None;

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::KW_UPDATE | Rule::KW_SET => {}
            Rule::qualified_name => table = Some(object_name(part)),
            Rule::assignment => {
                let mut inner = part.into_inner();
                let column = inner.next().ok_or_else(|| missing("assigned column"))?;
                let value = inner.next().ok_or_else(|| missing("assigned value"))?;
                assignments.push(Assignment {
                    column: identifier(&column),
                    value: build_expr(value)?,
                });
            }
            Rule::where_clause => selection = Some(child_expr(part)?),
            _ => return Err(unexpected(&part)),
        }
    }

    Ok(UpdateStatement {
        table: table.ok_or_else(|| missing("UPDATE target"))?,
        assignments,
        selection,
    })
}

fn build_delete(pair: Pair<Rule>) -> Result<DeleteStatement> {
    let mut table = None;
    let mut selection = None;

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::KW_DELETE | Rule::KW_FROM => {}
            Rule::qualified_name => table = Some(object_name(part)),
            Rule::where_clause => selection = Some(child_expr(part)?),
            _ => return Err(unexpected(&part)),
        }
    }

    Ok(DeleteStatement {
        table: table.ok_or_else(|| missing("DELETE target"))?,
        selection,
    })
}

// ============================================================================
// CREATE TABLE / DROP TABLE
// ============================================================================

fn build_create_table(pair: Pair<Rule>) -> Result<CreateTableStatement> {
    let mut if_not_exists = false;
    let mut name = None;
    let mut columns = Vec::new();

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::KW_CREATE | Rule::KW_TABLE => {}
            Rule::if_not_exists => if_not_exists = true,
            Rule::qualified_name => name = Some(object_name(part)),
            Rule::column_def => columns.push(build_column_def(part)?),
            _ => return Err(unexpected(&part)),
        }
    }

    Ok(CreateTableStatement {
        if_not_exists,
        name: name.ok_or_else(|| missing("table name"))?,
        columns,
    })
}

fn build_column_def(pair: Pair<Rule>) -> Result<ColumnDef> {
    let mut name = None;
    let mut data_type = None;
    let mut constraints = Vec::new();

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::identifier => name = Some(identifier(&part)),
            Rule::data_type => data_type = Some(build_data_type(part)?),
            Rule::column_constraint => constraints.push(build_constraint(part)?),
            _ => return Err(unexpected(&part)),
        }
    }

    Ok(ColumnDef {
        name: name.ok_or_else(|| missing("column name"))?,
        data_type: data_type.ok_or_else(|| missing("column type"))?,
        constraints,
    })
}

fn build_data_type(pair: Pair<Rule>) -> Result<DataType> {
    let mut name = None;
    let mut args = Vec::new();

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::type_name => name = Some(part.as_str().to_string()),
            Rule::type_args => {
                args = part.into_inner().map(|p| p.as_str().to_string()).collect();
            }
            _ => return Err(unexpected(&part)),
        }
    }

    Ok(DataType {
        name: name.ok_or_else(|| missing("type name"))?,
        args,
    })
}

fn build_constraint(pair: Pair<Rule>) -> Result<ColumnConstraint> {
    let inner = first_inner(pair, "column constraint")?;

    match inner.as_rule() {
        Rule::not_null_constraint => Ok(ColumnConstraint::NotNull),
        Rule::null_constraint => Ok(ColumnConstraint::Null),
        Rule::primary_key => Ok(ColumnConstraint::PrimaryKey),
        Rule::unique => Ok(ColumnConstraint::Unique),
        Rule::default_value => Ok(ColumnConstraint::Default(child_expr(inner)?)),
        _ => Err(unexpected(&inner)),
    }
}

fn build_drop_table(pair: Pair<Rule>) -> Result<DropTableStatement> {
    let mut if_exists = false;
    let mut name = None;

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::KW_DROP | Rule::KW_TABLE => {}
            Rule::if_exists => if_exists = true,
            Rule::qualified_name => name = Some(object_name(part)),
            _ => return Err(unexpected(&part)),
        }
    }

    Ok(DropTableStatement {
        if_exists,
        name: name.ok_or_else(|| missing("table name"))?,
    })
}

// ============================================================================
// Expressions
// ============================================================================

fn build_expr(pair: Pair<Rule>) -> Result<Expr> {
    climb(pair.into_inner())
}

fn climb(pairs: Pairs<Rule>) -> Result<Expr> {
    pratt()
        .map_primary(build_primary)
        .map_prefix(|op, rhs| {
            let op = match op.as_rule() {
                Rule::not_op => UnaryOp::Not,
                Rule::neg => UnaryOp::Minus,
                _ => return Err(unexpected(&op)),
            };
            Ok(Expr::Unary {
                op,
                expr: Box::new(rhs?),
            })
        })
        .map_postfix(|lhs, op| build_postfix(lhs?, op))
        .map_infix(|lhs, op, rhs| {
            Ok(Expr::Binary {
                left: Box::new(lhs?),
                op: binary_op(&op)?,
                right: Box::new(rhs?),
            })
        })
        .parse(pairs)
}

fn binary_op(pair: &Pair<Rule>) -> Result<BinaryOp> {
    let op = match pair.as_rule() {
        Rule::or_op => BinaryOp::Or,
        Rule::and_op => BinaryOp::And,
        Rule::eq => BinaryOp::Eq,
        Rule::neq => BinaryOp::NotEq,
        Rule::lt => BinaryOp::Lt,
        Rule::le => BinaryOp::LtEq,
        Rule::gt => BinaryOp::Gt,
        Rule::ge => BinaryOp::GtEq,
        Rule::like => BinaryOp::Like,
        Rule::not_like => BinaryOp::NotLike,
        Rule::concat => BinaryOp::Concat,
        Rule::add => BinaryOp::Plus,
        Rule::sub => BinaryOp::Minus,
        Rule::mul => BinaryOp::Multiply,
        Rule::div => BinaryOp::Divide,
        Rule::modulo => BinaryOp::Modulo,
        _ => return Err(unexpected(pair)),
    };
    Ok(op)
}

fn build_postfix(expr: Expr, op: Pair<Rule>) -> Result<Expr> {
    let expr = Box::new(expr);

    match op.as_rule() {
        Rule::is_null => Ok(Expr::IsNull {
            expr,
            negated: false,
        }),
        Rule::is_not_null => Ok(Expr::IsNull {
            expr,
            negated: true,
        }),
        Rule::in_list | Rule::not_in_list => {
            let negated = op.as_rule() == Rule::not_in_list;
            let mut list = Vec::new();
            for part in op.into_inner() {
                match part.as_rule() {
                    Rule::KW_NOT | Rule::KW_IN => {}
                    Rule::subquery => {
                        return Ok(Expr::InSubquery {
                            expr,
                            subquery: Box::new(build_subquery(part)?),
                            negated,
                        });
                    }
                    Rule::expr => list.push(build_expr(part)?),
                    _ => return Err(unexpected(&part)),
                }
            }
            Ok(Expr::InList {
                expr,
                list,
                negated,
            })
        }
        Rule::between | Rule::not_between => {
            let negated = op.as_rule() == Rule::not_between;
            let mut bounds = op.into_inner().filter(|p| p.as_rule() == Rule::bound);
            let low = bounds.next().ok_or_else(|| missing("lower BETWEEN bound"))?;
            let high = bounds.next().ok_or_else(|| missing("upper BETWEEN bound"))?;
            Ok(Expr::Between {
                expr,
                low: Box::new(climb(low.into_inner())?),
                high: Box::new(climb(high.into_inner())?),
                negated,
            })
        }
        _ => Err(unexpected(&op)),
    }
}

fn build_primary(pair: Pair<Rule>) -> Result<Expr> {
    match pair.as_rule() {
        Rule::expr => build_expr(pair),
        Rule::subquery => Ok(Expr::Subquery(Box::new(build_subquery(pair)?))),
        Rule::exists_expr => {
            let subquery = pair
                .into_inner()
                .find(|p| p.as_rule() == Rule::subquery)
                .ok_or_else(|| missing("EXISTS subquery"))?;
            Ok(Expr::Exists(Box::new(build_subquery(subquery)?)))
        }
        Rule::function_call => build_function(pair),
        Rule::null_lit => Ok(Expr::Literal(Literal::Null)),
        Rule::bool_lit => {
            let keyword = first_inner(pair, "TRUE or FALSE")?;
            Ok(Expr::Literal(Literal::Boolean(keyword.as_rule() == Rule::KW_TRUE)))
        }
        Rule::number => Ok(Expr::Literal(Literal::Number(pair.as_str().to_string()))),
        Rule::string => {
            let body = first_inner(pair, "string body")?;
            Ok(Expr::Literal(Literal::String(body.as_str().replace("''", "'"))))
        }
        Rule::column_ref => Ok(Expr::Column(object_name(pair))),
        _ => Err(unexpected(&pair)),
    }
}

fn build_function(pair: Pair<Rule>) -> Result<Expr> {
    let mut name = None;
    let mut distinct = false;
    let mut args = FunctionArgs::List(Vec::new());

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::identifier => name = Some(identifier(&part)),
            Rule::function_args => {
                let mut list = Vec::new();
                for arg in part.into_inner() {
                    match arg.as_rule() {
                        Rule::star_arg => args = FunctionArgs::Star,
                        Rule::KW_DISTINCT => distinct = true,
                        Rule::expr => list.push(build_expr(arg)?),
                        _ => return Err(unexpected(&arg)),
                    }
                }
                if !list.is_empty() {
                    args = FunctionArgs::List(list);
                }
            }
            _ => return Err(unexpected(&part)),
        }
    }

    Ok(Expr::Function {
        name: name.ok_or_else(|| missing("function name"))?,
        distinct,
        args,
    })
}
