//! mutable walks over parsed HCL
use hcl::{Body, Expression, Operation, Structure};

/// Visitor that visits its subjects mutably
pub trait VisitMut<T> {
    fn visit_mut(&mut self, value: &mut T);
}

impl<T, F> VisitMut<T> for F
where
    F: FnMut(&mut T),
{
    fn visit_mut(&mut self, value: &mut T) {
        self(value)
    }
}

/// Recursively visit all [hcl::Expression]s mutably, children before their parent
///
/// Templates are not entered: their interpolations are evaluated as part of the template.
pub trait VisitExpressionsMut {
    fn visit_expressions_mut(&mut self, visitor: &mut dyn VisitMut<Expression>);
}

impl VisitExpressionsMut for Body {
    fn visit_expressions_mut(&mut self, visitor: &mut dyn VisitMut<Expression>) {
        for structure in self.0.iter_mut() {
            match structure {
                Structure::Attribute(attr) => attr.expr.visit_expressions_mut(visitor),
                Structure::Block(block) => block.body.visit_expressions_mut(visitor),
            }
        }
    }
}

impl VisitExpressionsMut for Expression {
    fn visit_expressions_mut(&mut self, visitor: &mut dyn VisitMut<Expression>) {
        match self {
            Expression::Array(array) => {
                for expr in array {
                    expr.visit_expressions_mut(visitor);
                }
            }
            Expression::Object(object) => {
                for value in object.values_mut() {
                    value.visit_expressions_mut(visitor);
                }
            }
            Expression::Traversal(traversal) => {
                traversal.expr.visit_expressions_mut(visitor);
            }
            Expression::FuncCall(call) => {
                for arg in call.args.iter_mut() {
                    arg.visit_expressions_mut(visitor);
                }
            }
            Expression::Parenthesis(expr) => {
                expr.visit_expressions_mut(visitor);
            }
            Expression::Conditional(cond) => {
                cond.cond_expr.visit_expressions_mut(visitor);
                cond.true_expr.visit_expressions_mut(visitor);
                cond.false_expr.visit_expressions_mut(visitor);
            }
            Expression::Operation(operation) => match operation.as_mut() {
                Operation::Binary(binop) => {
                    binop.lhs_expr.visit_expressions_mut(visitor);
                    binop.rhs_expr.visit_expressions_mut(visitor);
                }
                Operation::Unary(unop) => {
                    unop.expr.visit_expressions_mut(visitor);
                }
            },
            Expression::ForExpr(forexpr) => {
                forexpr.collection_expr.visit_expressions_mut(visitor);
                forexpr
                    .key_expr
                    .iter_mut()
                    .for_each(|e| e.visit_expressions_mut(visitor));
                forexpr.value_expr.visit_expressions_mut(visitor);
                forexpr
                    .cond_expr
                    .iter_mut()
                    .for_each(|e| e.visit_expressions_mut(visitor));
            }
            _ => {}
        }
        visitor.visit_mut(self);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn children_are_visited_before_parents() {
        let mut body: Body = hcl::parse("x = [1, { a = 2 }]\nb {\n  y = 3\n}").unwrap();

        let mut seen = Vec::new();
        body.visit_expressions_mut(&mut |expr: &mut Expression| {
            seen.push(match expr {
                Expression::Number(n) => n.to_string(),
                Expression::Array(_) => "array".into(),
                Expression::Object(_) => "object".into(),
                _ => "other".into(),
            })
        });

        assert_eq!(seen, vec!["1", "2", "object", "array", "3"]);
    }
}
