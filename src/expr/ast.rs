//! 表达式 AST 与求值语义
//! 封闭变体 + 显式匹配，构建后不可变，可被多线程只读共享

use std::fmt;

use crate::response::ResponseData;

/// 条件可引用的响应字段，解析期即封闭
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Body,
    Header,
    Hash,
}

impl Field {
    /// 从标识符解析字段名，非法字段返回 None（由解析器转为编译错误）
    pub fn from_ident(name: &str) -> Option<Field> {
        match name {
            "body" => Some(Field::Body),
            "header" => Some(Field::Header),
            "hash" => Some(Field::Hash),
            _ => None,
        }
    }

    /// 取出响应数据中字段对应的文本
    fn resolve<'a>(&self, data: &'a ResponseData) -> &'a str {
        match self {
            Field::Body => &data.body,
            Field::Header => &data.headers,
            Field::Hash => &data.hash,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Body => "body",
            Field::Header => "header",
            Field::Hash => "hash",
        };
        f.write_str(name)
    }
}

/// 条件比较操作符，语义为子串包含而非精确相等
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// == / =：字段包含字面量
    Equals,
    /// !=：字段不包含字面量
    NotEquals,
}

/// 逻辑连接操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
}

impl LogicOp {
    /// 应用短路语义：右侧以闭包传入，仅在左侧无法决定结果时求值
    pub fn apply<F: FnOnce() -> bool>(self, left: bool, right: F) -> bool {
        match self {
            LogicOp::And => left && right(),
            LogicOp::Or => left || right(),
        }
    }
}

/// 表达式 AST 节点
/// Binary 独占持有左右子树，整体构成严格的树结构
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprNode {
    Condition {
        field: Field,
        op: CompareOp,
        literal: String,
    },
    Binary {
        op: LogicOp,
        left: Box<ExprNode>,
        right: Box<ExprNode>,
    },
}

impl ExprNode {
    /// 对一份响应数据求值：纯函数，无副作用，永不失败
    /// 采集失败导致的空字段自然不包含任何字面量
    /// hash 字段与 body/header 同为包含语义
    pub fn evaluate(&self, data: &ResponseData) -> bool {
        match self {
            ExprNode::Condition { field, op, literal } => {
                let target = field.resolve(data);
                match op {
                    CompareOp::Equals => target.contains(literal.as_str()),
                    CompareOp::NotEquals => !target.contains(literal.as_str()),
                }
            }
            ExprNode::Binary { op, left, right } => {
                op.apply(left.evaluate(data), || right.evaluate(data))
            }
        }
    }
}

// 单元测试
#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn body_data(body: &str) -> ResponseData {
        ResponseData {
            body: body.to_string(),
            ..ResponseData::default()
        }
    }

    fn condition(field: Field, op: CompareOp, literal: &str) -> ExprNode {
        ExprNode::Condition {
            field,
            op,
            literal: literal.to_string(),
        }
    }

    #[test]
    fn test_equals_is_contains() {
        // == 为子串包含，非精确相等
        let data = body_data("Welcome to site");
        let node = condition(Field::Body, CompareOp::Equals, "come");
        assert!(node.evaluate(&data));
    }

    #[test]
    fn test_not_equals_is_not_contains() {
        let data = body_data("Welcome to site");
        let node = condition(Field::Body, CompareOp::NotEquals, "come");
        assert!(!node.evaluate(&data));

        let node = condition(Field::Body, CompareOp::NotEquals, "absent");
        assert!(node.evaluate(&data));
    }

    #[test]
    fn test_header_and_hash_field_resolution() {
        let data = ResponseData {
            headers: "Server: nginx/1.21.6\r\nContent-Type: text/html\r\n".to_string(),
            hash: "1165838194".to_string(),
            ..ResponseData::default()
        };
        assert!(condition(Field::Header, CompareOp::Equals, "nginx").evaluate(&data));
        // hash 同样按包含语义匹配
        assert!(condition(Field::Hash, CompareOp::Equals, "1165838194").evaluate(&data));
        assert!(condition(Field::Hash, CompareOp::Equals, "6583").evaluate(&data));
    }

    #[test]
    fn test_empty_response_never_contains() {
        // 采集失败时字段为空，== 条件不命中，!= 条件命中
        let data = ResponseData::default();
        assert!(!condition(Field::Body, CompareOp::Equals, "x").evaluate(&data));
        assert!(condition(Field::Body, CompareOp::NotEquals, "x").evaluate(&data));
    }

    #[test]
    fn test_binary_and_or_evaluation() {
        let data = body_data("Apache Tomcat");
        let node = ExprNode::Binary {
            op: LogicOp::And,
            left: Box::new(condition(Field::Body, CompareOp::Equals, "Apache")),
            right: Box::new(condition(Field::Body, CompareOp::Equals, "Tomcat")),
        };
        assert!(node.evaluate(&data));

        let node = ExprNode::Binary {
            op: LogicOp::Or,
            left: Box::new(condition(Field::Body, CompareOp::Equals, "nginx")),
            right: Box::new(condition(Field::Body, CompareOp::Equals, "Tomcat")),
        };
        assert!(node.evaluate(&data));
    }

    #[test]
    fn test_and_short_circuits_on_false_left() {
        // 左侧为假时右侧不应被求值
        let evaluated = Cell::new(false);
        let result = LogicOp::And.apply(false, || {
            evaluated.set(true);
            true
        });
        assert!(!result);
        assert!(!evaluated.get());
    }

    #[test]
    fn test_or_short_circuits_on_true_left() {
        let evaluated = Cell::new(false);
        let result = LogicOp::Or.apply(true, || {
            evaluated.set(true);
            false
        });
        assert!(result);
        assert!(!evaluated.get());
    }

    #[test]
    fn test_and_or_evaluate_right_when_needed() {
        let evaluated = Cell::new(0);
        assert!(LogicOp::And.apply(true, || {
            evaluated.set(evaluated.get() + 1);
            true
        }));
        assert!(LogicOp::Or.apply(false, || {
            evaluated.set(evaluated.get() + 1);
            true
        }));
        assert_eq!(evaluated.get(), 2);
    }
}
