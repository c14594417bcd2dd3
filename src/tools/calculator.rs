//! 计算器工具：四则运算表达式求值
//!
//! 支持 + - * / % ^、括号与一元正负号；整数结果以 JSON 整数返回（`2+2` -> `{"result": 4}`）。
//! 嵌套深度超过 [`MAX_NESTING`] 的表达式直接报错。

use async_trait::async_trait;
use schemars::{schema_for, JsonSchema};
use serde::Deserialize;
use serde_json::Value;

use crate::tools::Tool;

/// 递归下降的最大嵌套层数（括号、一元符号与 ^ 链都计入）
pub const MAX_NESTING: usize = 128;

/// 计算器参数
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CalculatorArgs {
    /// 算术表达式，如 "2 + 3 * (4 - 1)"
    pub expression: String,
}

pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluate an arithmetic expression. Args: {\"expression\": \"2+2\"}"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::to_value(schema_for!(CalculatorArgs)).unwrap_or(Value::Null)
    }

    async fn execute(&self, input: Value) -> Result<Value, String> {
        let args: CalculatorArgs =
            serde_json::from_value(input).map_err(|e| format!("invalid arguments: {e}"))?;
        let value = evaluate(&args.expression)?;
        Ok(serde_json::json!({ "result": number_to_json(value)? }))
    }
}

fn number_to_json(value: f64) -> Result<Value, String> {
    if !value.is_finite() {
        return Err("result is not a finite number".to_string());
    }
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        return Ok(Value::from(value as i64));
    }
    Ok(Value::from(value))
}

/// 对表达式求值
pub fn evaluate(expression: &str) -> Result<f64, String> {
    let mut parser = Parser {
        chars: expression.chars().filter(|c| !c.is_whitespace()).collect(),
        pos: 0,
        depth: 0,
    };
    if parser.chars.is_empty() {
        return Err("empty expression".to_string());
    }
    let value = parser.expr()?;
    if parser.pos < parser.chars.len() {
        return Err(format!(
            "unexpected '{}' at position {}",
            parser.chars[parser.pos], parser.pos
        ));
    }
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn expr(&mut self) -> Result<f64, String> {
        let mut value = self.term()?;
        while let Some(op) = self.peek() {
            match op {
                '+' => {
                    self.pos += 1;
                    value += self.term()?;
                }
                '-' => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, String> {
        let mut value = self.power()?;
        while let Some(op) = self.peek() {
            match op {
                '*' => {
                    self.pos += 1;
                    value *= self.power()?;
                }
                '/' | '%' => {
                    self.pos += 1;
                    let rhs = self.power()?;
                    if rhs == 0.0 {
                        return Err("division by zero".to_string());
                    }
                    value = if op == '/' { value / rhs } else { value % rhs };
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self) -> Result<f64, String>) -> Result<f64, String> {
        if self.depth >= MAX_NESTING {
            return Err("expression nested too deeply".to_string());
        }
        self.depth += 1;
        let value = f(self);
        self.depth -= 1;
        value
    }

    // 右结合
    fn power(&mut self) -> Result<f64, String> {
        self.nested(|p| {
            let base = p.unary()?;
            if p.peek() == Some('^') {
                p.pos += 1;
                let exp = p.power()?;
                return Ok(base.powf(exp));
            }
            Ok(base)
        })
    }

    fn unary(&mut self) -> Result<f64, String> {
        self.nested(|p| match p.peek() {
            Some('-') => {
                p.pos += 1;
                Ok(-p.unary()?)
            }
            Some('+') => {
                p.pos += 1;
                p.unary()
            }
            _ => p.primary(),
        })
    }

    fn primary(&mut self) -> Result<f64, String> {
        match self.peek() {
            Some('(') => {
                self.pos += 1;
                let value = self.expr()?;
                if self.peek() != Some(')') {
                    return Err("missing closing parenthesis".to_string());
                }
                self.pos += 1;
                Ok(value)
            }
            Some(c) if c.is_ascii_digit() || c == '.' => {
                let start = self.pos;
                while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
                    self.pos += 1;
                }
                let literal: String = self.chars[start..self.pos].iter().collect();
                literal
                    .parse::<f64>()
                    .map_err(|_| format!("invalid number '{literal}'"))
            }
            Some(c) => Err(format!("unexpected '{}' at position {}", c, self.pos)),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}
