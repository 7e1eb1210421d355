//! Executes a [`ValidatedProgram`] by walking its syntax tree.

use std::collections::HashMap;
use std::io::Write;

use kite_parser::ast::*;
use kite_passes::validate::MAIN_FUNCTION;
use kite_passes::validated::{ValidatedClass, ValidatedProgram};
use kite_value::{Object, Value};
use num_traits::{CheckedAdd, CheckedDiv, CheckedMul, CheckedRem, CheckedSub, Zero};
use tracing::{debug, trace};

use crate::environment::Environment;
use crate::error::{RuntimeError, RuntimeResult};

/// What a statement asks the enclosing block to do next.
#[derive(Debug, Clone, PartialEq)]
enum Flow {
    Continue,
    /// Unwinds every enclosing block up to the invocation boundary.
    Return(Option<Value>),
}

/// Property values of an object, copied into an invocation and copied back out of it.
type Properties = HashMap<String, Value>;

fn internal(message: impl ToString) -> RuntimeError {
    RuntimeError::Internal(message.to_string())
}

/// Every kite call recurses on the host stack, so deeply recursive programs can overflow it.
pub struct Executor<'p, 'a> {
    program: &'p ValidatedProgram<'a>,
    /// Sink of the print builtins.
    out: &'p mut dyn Write,
}

impl<'p, 'a> Executor<'p, 'a> {
    pub fn new(program: &'p ValidatedProgram<'a>, out: &'p mut dyn Write) -> Self {
        Self { program, out }
    }

    /// Runs the `Main` function.
    pub fn execute(&mut self) -> RuntimeResult<()> {
        let program = self.program;
        let main = program
            .functions
            .get(MAIN_FUNCTION)
            .copied()
            .ok_or_else(|| internal("no 'Main' function"))?;

        debug!("executing program");
        self.invoke(main, Vec::new(), Environment::new(None))?;
        self.out.flush()?;
        debug!("program finished");
        Ok(())
    }
}

/// Invocations.
impl<'p, 'a> Executor<'p, 'a> {
    /// Binds `args` to the parameters of `def` in `env` and runs its body.
    /// `env` may already hold the receiver's properties.
    fn invoke(
        &mut self,
        def: &'a FunctionDefinition,
        args: Vec<Value>,
        mut env: Environment<'p, 'a>,
    ) -> RuntimeResult<(Option<Value>, Environment<'p, 'a>)> {
        trace!(function = %def.ident, "invoke");
        if def.params.len() != args.len() {
            return Err(internal(format!(
                "'{}' invoked with {} argument(s)",
                def.ident,
                args.len()
            )));
        }
        for (param, arg) in def.params.iter().zip(args) {
            env.declare(&param.ident, arg);
        }

        let value = match self.exec_block(&def.body, &mut env)? {
            Flow::Return(value) => value,
            Flow::Continue => None,
        };
        Ok((value, env))
    }

    /// Runs the constructor of `class` and returns the new object.
    /// Only properties survive the constructor; its parameters and locals are discarded.
    fn construct(&mut self, class: &'p ValidatedClass<'a>, args: Vec<Value>) -> RuntimeResult<Value> {
        let mut env = Environment::new(Some(class));
        for &property in &class.properties {
            let value = match &property.initializer {
                Some(initializer) => self.eval_expr(initializer, &mut env)?,
                None => Value::default_for(&property.ty)
                    .ok_or_else(|| internal(format!("property '{}' is void", property.ident)))?,
            };
            env.declare(&property.ident, value);
        }

        let (_, mut env) = self.invoke(class.constructor(), args, env)?;

        let mut object = Object::new(class.ident().to_string());
        for property in &class.properties {
            let value = env
                .take(&property.ident)
                .ok_or_else(|| internal(format!("property '{}' vanished", property.ident)))?;
            object.properties.insert(property.ident.clone(), value);
        }
        Ok(Value::Object(object))
    }

    /// Runs `method` against a copy of `properties` and returns the result with the properties as the method
    /// left them.
    fn invoke_method(
        &mut self,
        class: &'p ValidatedClass<'a>,
        method: &'a FunctionDefinition,
        properties: Properties,
        args: Vec<Value>,
    ) -> RuntimeResult<(Option<Value>, Properties)> {
        let mut env = Environment::new(Some(class));
        for (ident, value) in properties {
            env.declare(&ident, value);
        }

        let (value, mut env) = self.invoke(method, args, env)?;

        let properties = class
            .properties
            .iter()
            .filter_map(|p| env.take(&p.ident).map(|value| (p.ident.clone(), value)))
            .collect();
        Ok((value, properties))
    }

    /// Plain call: class constructor, method of the running class, function or builtin.
    fn call_fn(&mut self, call: &'a FnCall, env: &mut Environment<'p, 'a>) -> RuntimeResult<Option<Value>> {
        let args = self.eval_args(&call.args, env)?;
        let program = self.program;
        let ident = call.ident.as_str();

        if let Some(class) = program.classes.get(ident) {
            return self.construct(class, args).map(Some);
        }

        if let Some(class) = env.class {
            if let Some(&method) = class.methods.get(ident) {
                // runs against the caller's property bindings
                let properties = class
                    .properties
                    .iter()
                    .filter_map(|p| env.get(&p.ident).map(|value| (p.ident.clone(), value.clone())))
                    .collect();
                let (value, properties) = self.invoke_method(class, method, properties, args)?;
                for (ident, value) in properties {
                    env.assign(&ident, value);
                }
                return Ok(value);
            }
        }

        if let Some(&function) = program.functions.get(ident) {
            let (value, _) = self.invoke(function, args, Environment::new(None))?;
            return Ok(value);
        }

        if let Some(builtin) = program.builtins.get(ident) {
            let arg = args
                .first()
                .ok_or_else(|| internal(format!("'{}' invoked without argument", ident)))?;
            builtin.call(arg, self.out)?;
            return Ok(None);
        }

        Err(internal(format!("unresolved function '{}'", ident)))
    }

    /// `object.method(args)`. Properties are copied into the invocation and written back afterwards.
    fn call_method(
        &mut self,
        method_call: &'a MethodCall,
        env: &mut Environment<'p, 'a>,
    ) -> RuntimeResult<Option<Value>> {
        let args = self.eval_args(&method_call.call.args, env)?;
        let program = self.program;
        let object_ident = &method_call.object;

        let object = match env.get(object_ident) {
            Some(Value::Object(object)) => object,
            Some(Value::Null(_)) => {
                return Err(RuntimeError::NullReference {
                    object: object_ident.clone(),
                })
            }
            _ => return Err(internal(format!("'{}' is not an object", object_ident))),
        };
        let class = program
            .classes
            .get(object.class.as_str())
            .ok_or_else(|| internal(format!("unknown class '{}'", object.class)))?;
        let method = class
            .methods
            .get(method_call.call.ident.as_str())
            .copied()
            .ok_or_else(|| internal(format!("unknown method '{}'", method_call.call.ident)))?;
        let properties = object.properties.clone();

        let (value, properties) = self.invoke_method(class, method, properties, args)?;

        if let Some(Value::Object(object)) = env.get_mut(object_ident) {
            for (ident, value) in properties {
                object.set(&ident, value);
            }
        }
        Ok(value)
    }

    fn eval_args(&mut self, args: &'a [Expr], env: &mut Environment<'p, 'a>) -> RuntimeResult<Vec<Value>> {
        args.iter().map(|arg| self.eval_expr(arg, env)).collect()
    }
}

/// Statements.
impl<'p, 'a> Executor<'p, 'a> {
    /// Runs `body` in the current frame. Stops at the first `return`.
    fn exec_block(&mut self, body: &'a [Stmt], env: &mut Environment<'p, 'a>) -> RuntimeResult<Flow> {
        for stmt in body {
            if let Flow::Return(value) = self.exec_stmt(stmt, env)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Continue)
    }

    /// Runs `body` in its own frame.
    fn exec_nested_block(
        &mut self,
        body: &'a [Stmt],
        env: &mut Environment<'p, 'a>,
    ) -> RuntimeResult<Flow> {
        env.enter_scope();
        let flow = self.exec_block(body, env);
        env.exit_scope();
        flow
    }

    fn exec_stmt(&mut self, stmt: &'a Stmt, env: &mut Environment<'p, 'a>) -> RuntimeResult<Flow> {
        match stmt {
            Stmt::VarDeclaration(VarDeclaration {
                ident,
                ty,
                initializer,
            }) => {
                let value = match initializer {
                    Some(initializer) => self.eval_expr(initializer, env)?,
                    None => Value::default_for(ty)
                        .ok_or_else(|| internal(format!("variable '{}' is void", ident)))?,
                };
                env.declare(ident, value);
            }
            Stmt::Assignment { ident, value } => {
                let value = self.eval_expr(value, env)?;
                if !env.assign(ident, value) {
                    return Err(internal(format!("assignment to undefined '{}'", ident)));
                }
            }
            Stmt::FnCall(call) => {
                self.call_fn(call, env)?;
            }
            Stmt::MethodCall(method_call) => {
                self.call_method(method_call, env)?;
            }
            Stmt::If {
                condition,
                then_block,
                else_block,
            } => {
                if self.eval_condition(condition, env)? {
                    return self.exec_nested_block(then_block, env);
                } else if let Some(else_block) = else_block {
                    return self.exec_nested_block(else_block, env);
                }
            }
            Stmt::While { condition, body } => {
                while self.eval_condition(condition, env)? {
                    if let Flow::Return(value) = self.exec_nested_block(body, env)? {
                        return Ok(Flow::Return(value));
                    }
                }
            }
            Stmt::Return(value) => {
                let value = match value {
                    Some(value) => Some(self.eval_expr(value, env)?),
                    None => None,
                };
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Continue)
    }

    fn eval_condition(&mut self, condition: &'a Expr, env: &mut Environment<'p, 'a>) -> RuntimeResult<bool> {
        self.eval_expr(condition, env)?
            .cast_to_bool()
            .ok_or_else(|| internal("condition is not a bool"))
    }
}

/// Expressions.
impl<'p, 'a> Executor<'p, 'a> {
    fn eval_expr(&mut self, expr: &'a Expr, env: &mut Environment<'p, 'a>) -> RuntimeResult<Value> {
        match expr {
            Expr::IntLit(val) => Ok(Value::Int(*val)),
            Expr::BoolLit(val) => Ok(Value::Bool(*val)),
            Expr::StringLit(val) => Ok(Value::Str(val.clone())),
            Expr::Variable(ident) => env
                .get(ident)
                .cloned()
                .ok_or_else(|| internal(format!("undefined variable '{}'", ident))),
            Expr::PropertyAccess { object, property } => match env.get(object) {
                Some(Value::Object(obj)) => obj
                    .get(property)
                    .cloned()
                    .ok_or_else(|| internal(format!("unknown property '{}'", property))),
                Some(Value::Null(_)) => Err(RuntimeError::NullReference {
                    object: object.clone(),
                }),
                _ => Err(internal(format!("'{}' is not an object", object))),
            },
            Expr::FnCall(call) => self
                .call_fn(call, env)?
                .ok_or_else(|| RuntimeError::MissingReturnValue {
                    function: call.ident.clone(),
                }),
            Expr::MethodCall(method_call) => self
                .call_method(method_call, env)?
                .ok_or_else(|| RuntimeError::MissingReturnValue {
                    function: method_call.call.ident.clone(),
                }),
            Expr::Binary { lhs, op, rhs } => self.eval_binary(lhs, *op, rhs, env),
            Expr::Not(operand) => {
                let operand = self.eval_expr(operand, env)?;
                operand
                    .cast_to_bool()
                    .map(|val| Value::Bool(!val))
                    .ok_or_else(|| internal("operand of 'not' is not a bool"))
            }
        }
    }

    fn eval_binary(
        &mut self,
        lhs: &'a Expr,
        op: BinOp,
        rhs: &'a Expr,
        env: &mut Environment<'p, 'a>,
    ) -> RuntimeResult<Value> {
        /// Generates a checked integer operation.
        macro_rules! checked_int_op {
            ($a: ident, $b: ident, $op: path) => {
                $op(&$a, &$b)
                    .map(Value::Int)
                    .ok_or(RuntimeError::IntegerOverflow { op })
            };
        }

        // `or` and `and` only evaluate the right operand when it decides the result
        if op.is_logical() {
            let lhs = self.eval_bool(lhs, env)?;
            return match (op, lhs) {
                (BinOp::Or, true) => Ok(Value::Bool(true)),
                (BinOp::And, false) => Ok(Value::Bool(false)),
                _ => self.eval_bool(rhs, env).map(Value::Bool),
            };
        }

        let lhs = self.eval_expr(lhs, env)?;
        let rhs = self.eval_expr(rhs, env)?;

        if op.is_equality() {
            let equal = lhs == rhs;
            return Ok(Value::Bool(if op == BinOp::Equals { equal } else { !equal }));
        }

        let (a, b) = match (lhs.cast_to_int(), rhs.cast_to_int()) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                return Err(internal(format!(
                    "operands of '{}' are not integers: {} and {}",
                    op, lhs, rhs
                )))
            }
        };

        match op {
            BinOp::Less => Ok(Value::Bool(a < b)),
            BinOp::LessEquals => Ok(Value::Bool(a <= b)),
            BinOp::Greater => Ok(Value::Bool(a > b)),
            BinOp::GreaterEquals => Ok(Value::Bool(a >= b)),
            BinOp::Add => checked_int_op!(a, b, CheckedAdd::checked_add),
            BinOp::Sub => checked_int_op!(a, b, CheckedSub::checked_sub),
            BinOp::Mul => checked_int_op!(a, b, CheckedMul::checked_mul),
            BinOp::Div | BinOp::Mod if b.is_zero() => Err(RuntimeError::DivisionByZero { op }),
            BinOp::Div => checked_int_op!(a, b, CheckedDiv::checked_div),
            BinOp::Mod => checked_int_op!(a, b, CheckedRem::checked_rem),
            BinOp::Or | BinOp::And | BinOp::Equals | BinOp::NotEquals => {
                Err(internal(format!("unexpected operator '{}'", op)))
            }
        }
    }

    fn eval_bool(&mut self, expr: &'a Expr, env: &mut Environment<'p, 'a>) -> RuntimeResult<bool> {
        self.eval_expr(expr, env)?
            .cast_to_bool()
            .ok_or_else(|| internal("operand of a logical operator is not a bool"))
    }
}
