//! expression evaluation against the scope tree
use crate::conversion::{tagged_kind, ConversionError};
use crate::error::BoxError;
use crate::tree::Tree;
use crate::visit::{VisitExpressionsMut, VisitMut};
use hcl::eval::{Context, Evaluate, FuncDef};
use hcl::expr::ObjectKey;
use hcl::{Body, Expression, Identifier};
use indexmap::IndexMap;

/// Name of the function that stands for an intentionally absent value
pub(crate) const NULL_FUNCTION: &str = "null";

/// Replace every `null()` call with the `null` literal
pub(crate) fn rewrite_null_calls(body: &mut Body) {
    let mut rewrite = |expr: &mut Expression| {
        let is_null = matches!(
            &*expr,
            Expression::FuncCall(call) if call.name.to_string() == NULL_FUNCTION && call.args.is_empty()
        );
        if is_null {
            *expr = Expression::Null;
        }
    };
    body.visit_expressions_mut(&mut rewrite as &mut dyn VisitMut<Expression>);
}

/// Evaluate `expr` with everything visible from `root`, plus the items of `node` unqualified
pub(crate) fn evaluate(
    expr: &Expression,
    root: &Tree,
    node: &Tree,
    functions: &IndexMap<String, FuncDef>,
) -> Result<hcl::Value, BoxError> {
    let mut ctx = Context::new();
    for (name, value) in root.snapshot() {
        ctx.declare_var(Identifier::unchecked(name), value);
    }
    if !std::ptr::eq(root, node) {
        for (name, value) in node.snapshot() {
            ctx.declare_var(Identifier::unchecked(name), value);
        }
    }
    for (name, func) in functions {
        ctx.declare_func(Identifier::unchecked(name.as_str()), func.clone());
    }

    evaluate_in(expr, &ctx)
}

fn evaluate_in(expr: &Expression, ctx: &Context) -> Result<hcl::Value, BoxError> {
    match expr {
        Expression::Array(items) => Ok(hcl::Value::Array(
            items
                .iter()
                .map(|item| evaluate_in(item, ctx))
                .collect::<Result<_, _>>()?,
        )),
        Expression::Object(object) => {
            let mut map = hcl::value::Map::new();
            for (key, value) in object {
                map.insert(object_key(key, ctx)?, evaluate_in(value, ctx)?);
            }
            Ok(hcl::Value::Object(map))
        }
        other => Ok(other.evaluate(ctx)?),
    }
}

fn object_key(key: &ObjectKey, ctx: &Context) -> Result<String, BoxError> {
    match key {
        ObjectKey::Identifier(ident) => Ok(ident.to_string()),
        ObjectKey::Expression(expr) => match evaluate_in(expr, ctx)? {
            hcl::Value::String(s) => Ok(s),
            hcl::Value::Number(n) => Ok(n.to_string()),
            other => Err(ConversionError::NonStringKey(tagged_kind(&other)).into()),
        },
        #[allow(unreachable_patterns)]
        _ => Err(ConversionError::Unsupported("object key".into()).into()),
    }
}
