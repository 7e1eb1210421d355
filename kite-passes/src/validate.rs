//! Semantic validation pass.
//!
//! Validation runs in two passes over the syntax tree:
//! 1. Headers: every class and function signature is checked and registered, so bodies may refer to
//!    definitions that appear later in the source.
//! 2. Bodies: every instruction of every registered function, constructor and method is type checked.
//!
//! Semantic errors do not stop validation. They are all recorded in the [`Source`] and reported together once
//! both passes are done.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ptr;

use kite_parser::ast::*;
use kite_source::{Fatal, Source};
use kite_value::Builtins;
use tracing::{debug, trace};

use crate::scope::ScopeContext;
use crate::validated::{FnTable, ValidatedClass, ValidatedProgram};

/// Name of the entry point function.
pub const MAIN_FUNCTION: &str = "Main";

/// Validates `program` with a fresh [`Validator`].
pub fn validate<'a>(
    program: &'a Program,
    builtins: &'a Builtins,
    source: &'a Source<'a>,
) -> Result<ValidatedProgram<'a>, Fatal> {
    Validator::new(builtins, source).validate(program)
}

/// Renders an inferred type. A type that could not be inferred renders as an empty string.
struct Inferred<'t>(&'t Option<Type>);

impl fmt::Display for Inferred<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(ty) => write!(f, "{}", ty),
            None => Ok(()),
        }
    }
}

/// Parameters and return type of a callee.
struct Signature<'t> {
    /// Name used in arity errors.
    ident: &'t str,
    params: Vec<&'t Type>,
    return_ty: Type,
}

impl<'t> Signature<'t> {
    fn of(def: &'t FunctionDefinition) -> Self {
        Self {
            ident: &def.ident,
            params: def.params.iter().map(|p| &p.ty).collect(),
            return_ty: def.return_ty.clone(),
        }
    }
}

pub struct Validator<'a> {
    builtins: &'a Builtins,
    classes: HashMap<&'a str, ValidatedClass<'a>>,
    functions: FnTable<'a>,
    source: &'a Source<'a>,
}

impl<'a> Validator<'a> {
    pub fn new(builtins: &'a Builtins, source: &'a Source<'a>) -> Self {
        Self {
            builtins,
            classes: HashMap::new(),
            functions: HashMap::new(),
            source,
        }
    }

    /// Runs both passes. Returns [`Fatal`] if any semantic error was recorded.
    pub fn validate(mut self, program: &'a Program) -> Result<ValidatedProgram<'a>, Fatal> {
        for class in &program.classes {
            self.validate_class_header(class);
        }
        for function in &program.functions {
            self.validate_fn_header(function);
        }
        self.validate_main_fn();
        debug!(
            functions = self.functions.len(),
            classes = self.classes.len(),
            "registered definitions"
        );

        // Bodies are validated in source order, functions first.
        // Definitions rejected by the header pass are skipped.
        for function in &program.functions {
            if self.is_registered_fn(function) {
                self.validate_fn_body(function);
            }
        }
        for class in &program.classes {
            if let Some(validated) = self.classes.get(class.ident.as_str()) {
                if ptr::eq(validated.def, class) {
                    self.validate_class_bodies(validated);
                }
            }
        }

        debug!(
            errors = self.source.errors.errors().len(),
            warnings = self.source.errors.warnings().len(),
            "validation done"
        );
        self.source.errors.check()?;

        Ok(ValidatedProgram {
            functions: self.functions,
            classes: self.classes,
            builtins: self.builtins,
        })
    }

    fn error(&self, message: String) {
        self.source.errors.add_error(message);
    }

    fn warning(&self, message: String) {
        self.source.errors.add_warning(message);
    }

    /// `int`, `bool`, `string` or a class registered so far. `void` is not a value type.
    ///
    /// A class header only sees the classes declared before it, itself excluded.
    fn is_known_type(&self, ty: &Type) -> bool {
        match ty {
            Type::Int | Type::Bool | Type::String => true,
            Type::Class(ident) => self.classes.contains_key(ident.as_str()),
            Type::Void => false,
        }
    }

    fn is_registered_fn(&self, function: &FunctionDefinition) -> bool {
        self.functions
            .get(function.ident.as_str())
            .map_or(false, |registered| ptr::eq(*registered, function))
    }
}

/// Header pass.
impl<'a> Validator<'a> {
    fn validate_class_header(&mut self, class: &'a ClassDefinition) {
        let class_ident = &class.ident;
        let mut registrable = true;
        if self.classes.contains_key(class_ident.as_str()) {
            self.error(format!("Redefinition of class '{}'", class_ident));
            registrable = false;
        }
        if class_ident == MAIN_FUNCTION {
            self.error(format!(
                "Class can not be defined with name '{}'",
                MAIN_FUNCTION
            ));
            registrable = false;
        }

        let mut properties: Vec<&'a VarDeclaration> = Vec::new();
        for property in &class.properties {
            if !self.is_known_type(&property.ty) {
                self.error(format!(
                    "Declaration property '{}' of unknown type '{}' in class '{}' definition",
                    property.ident, property.ty, class_ident
                ));
            }
            if properties.iter().any(|p| p.ident == property.ident) {
                self.error(format!(
                    "Redefinition of property '{}' in class '{}' definition",
                    property.ident, class_ident
                ));
            } else {
                properties.push(property);
            }
            if let Some(initializer) = &property.initializer {
                let initializer_ty = literal_type(initializer);
                if initializer_ty.as_ref() != Some(&property.ty) {
                    self.error(format!(
                        "Unable assign expression with type '{}' to property '{}' with type '{}' in class '{}' definition",
                        Inferred(&initializer_ty), property.ident, property.ty, class_ident
                    ));
                }
            }
        }
        let is_property = |ident: &str| properties.iter().any(|p| p.ident == ident);

        let mut methods = FnTable::new();
        for method in &class.methods {
            if !self.is_known_type(&method.return_ty) && method.return_ty != Type::Void {
                self.error(format!(
                    "Unknown type '{}' in method '{}' definition in '{}' class",
                    method.return_ty, method.ident, class_ident
                ));
            }
            if methods.contains_key(method.ident.as_str()) {
                self.error(format!(
                    "Redefinition of method '{}' in '{}' class",
                    method.ident, class_ident
                ));
            }
            if self.builtins.contains(&method.ident) {
                self.error(format!(
                    "Redefinition of std function '{}' in '{}' class",
                    method.ident, class_ident
                ));
            }

            let mut params = HashSet::new();
            for param in &method.params {
                if !self.is_known_type(&param.ty) {
                    self.error(format!(
                        "Unknown type '{}' for '{}' parameter in method '{}' definition in '{}' class",
                        param.ty, param.ident, method.ident, class_ident
                    ));
                }
                if is_property(&param.ident) {
                    self.error(format!(
                        "Parameter '{}' conflicts with property in method '{}' definition in '{}' class",
                        param.ident, method.ident, class_ident
                    ));
                }
                if !params.insert(param.ident.as_str()) {
                    self.error(format!(
                        "Redefinition of parameter '{}' in method '{}' definition",
                        param.ident, method.ident
                    ));
                }
            }
            methods.entry(method.ident.as_str()).or_insert(method);
        }

        let mut params = HashSet::new();
        for param in &class.constructor.params {
            if !self.is_known_type(&param.ty) {
                self.error(format!(
                    "Unknown type '{}' for '{}' parameter in constructor definition in '{}' class",
                    param.ty, param.ident, class_ident
                ));
            }
            if is_property(&param.ident) {
                self.error(format!(
                    "Parameter '{}' conflicts with property in constructor definition in '{}' class",
                    param.ident, class_ident
                ));
            }
            if !params.insert(param.ident.as_str()) {
                self.error(format!(
                    "Redefinition of parameter '{}' in constructor definition in '{}' class",
                    param.ident, class_ident
                ));
            }
        }

        if registrable {
            trace!(class = %class_ident, "registered class");
            self.classes.insert(
                class_ident,
                ValidatedClass {
                    def: class,
                    methods,
                    properties,
                },
            );
        }
    }

    fn validate_fn_header(&mut self, function: &'a FunctionDefinition) {
        let ident = &function.ident;
        if !self.is_known_type(&function.return_ty) && function.return_ty != Type::Void {
            self.error(format!(
                "Unknown type '{}' in function '{}' definition",
                function.return_ty, ident
            ));
        }

        let mut registrable = false;
        if self.classes.contains_key(ident.as_str()) {
            self.error(format!(
                "Function '{}' conflicts with already defined class '{}'",
                ident, ident
            ));
        } else if self.functions.contains_key(ident.as_str()) {
            self.error(format!("Redefinition of function '{}'", ident));
        } else if self.builtins.contains(ident) {
            self.error(format!("Redefinition of standard lib function '{}'", ident));
        } else {
            registrable = true;
        }

        let mut params = HashSet::new();
        for param in &function.params {
            if !self.is_known_type(&param.ty) {
                self.error(format!(
                    "Unknown type '{}' for '{}' parameter in function '{}' definition",
                    param.ty, param.ident, ident
                ));
            }
            if !params.insert(param.ident.as_str()) {
                self.error(format!(
                    "Redefinition of parameter '{}' in function '{}' definition",
                    param.ident, ident
                ));
            }
        }

        if registrable {
            trace!(function = %ident, "registered function");
            self.functions.insert(ident, function);
        }
    }

    /// Each violation is reported separately.
    fn validate_main_fn(&self) {
        let main = match self.functions.get(MAIN_FUNCTION) {
            Some(main) => main,
            None => {
                self.error(format!("No '{}' function is defined", MAIN_FUNCTION));
                return;
            }
        };
        if main.return_ty != Type::Void {
            self.error(format!(
                "Function '{}' have to have '{}' type",
                MAIN_FUNCTION,
                Type::Void
            ));
        }
        if !main.params.is_empty() {
            self.error(format!(
                "Function '{}' can not have parameters",
                MAIN_FUNCTION
            ));
        }
    }
}

/// Body pass.
impl<'a> Validator<'a> {
    fn validate_fn_body(&self, function: &'a FunctionDefinition) {
        trace!(function = %function.ident, "validating function body");
        let mut scope = ScopeContext::new(function.return_ty.clone(), None);
        for param in &function.params {
            scope.declare(&param.ident, param.ty.clone(), true);
        }
        self.validate_block(&function.body, &mut scope);
    }

    /// Validates the constructor and every method of `class`.
    /// Properties are visible as initialized variables, methods as plain functions.
    fn validate_class_bodies(&self, class: &ValidatedClass<'a>) {
        trace!(class = %class.ident(), "validating class bodies");
        let bodies = std::iter::once((class.constructor(), Type::Void)).chain(
            class
                .def
                .methods
                .iter()
                .filter(|method| {
                    class
                        .methods
                        .get(method.ident.as_str())
                        .map_or(false, |registered| ptr::eq(*registered, *method))
                })
                .map(|method| (method, method.return_ty.clone())),
        );

        for (def, return_ty) in bodies {
            let mut scope = ScopeContext::new(return_ty, Some(&class.methods));
            for property in &class.properties {
                scope.declare(&property.ident, property.ty.clone(), true);
            }
            for param in &def.params {
                scope.declare(&param.ident, param.ty.clone(), true);
            }
            self.validate_block(&def.body, &mut scope);
        }
    }

    fn validate_block(&self, body: &[Stmt], scope: &mut ScopeContext<'_, 'a>) {
        for stmt in body {
            self.validate_stmt(stmt, scope);
        }
    }

    /// Validates `body` in its own frame.
    fn validate_nested_block(&self, body: &[Stmt], scope: &mut ScopeContext<'_, 'a>) {
        scope.enter_scope();
        self.validate_block(body, scope);
        scope.exit_scope();
    }

    fn validate_stmt(&self, stmt: &Stmt, scope: &mut ScopeContext<'_, 'a>) {
        match stmt {
            Stmt::VarDeclaration(VarDeclaration {
                ident,
                ty,
                initializer,
            }) => {
                if !self.is_known_type(ty) {
                    self.error(format!(
                        "Declaration variable '{}' of unknown type '{}'",
                        ident, ty
                    ));
                }
                let declared = scope.declare(ident, ty.clone(), false);
                if !declared {
                    self.error(format!("Redeclaration of variable '{}'", ident));
                }

                if let Some(initializer) = initializer {
                    let initializer_ty = self.infer_expr(initializer, scope);
                    if initializer_ty.as_ref() != Some(ty) {
                        self.error(format!(
                            "Unable assign expression with type '{}' to variable '{}' with type '{}'",
                            Inferred(&initializer_ty),
                            ident,
                            ty
                        ));
                    }
                    if declared {
                        scope.mark_initialized(ident);
                    }
                }
            }
            Stmt::Assignment { ident, value } => {
                let variable = match scope.get(ident) {
                    Some(variable) => variable,
                    None => {
                        self.error(format!("Assignment to undefined variable '{}'", ident));
                        return;
                    }
                };
                let value_ty = self.infer_expr(value, scope);
                if value_ty.as_ref() != Some(&variable.ty) {
                    self.error(format!(
                        "Unable assign expression with type '{}' to variable '{}' with type '{}'",
                        Inferred(&value_ty),
                        ident,
                        variable.ty
                    ));
                }
                scope.mark_initialized(ident);
            }
            Stmt::FnCall(call) => {
                if let Some(return_ty) = self.validate_fn_call(call, scope) {
                    if return_ty != Type::Void {
                        self.warning(format!(
                            "Return value from function '{}' is not used",
                            call.ident
                        ));
                    }
                }
            }
            Stmt::MethodCall(method_call) => {
                if let Some(return_ty) = self.validate_method_call(method_call, scope) {
                    if return_ty != Type::Void {
                        self.warning(format!(
                            "Return value from method '{}' called on object '{}' is not used",
                            method_call.call.ident, method_call.object
                        ));
                    }
                }
            }
            Stmt::If {
                condition,
                then_block,
                else_block,
            } => {
                self.validate_condition(condition, scope);
                self.validate_nested_block(then_block, scope);
                if let Some(else_block) = else_block {
                    self.validate_nested_block(else_block, scope);
                }
            }
            Stmt::While { condition, body } => {
                self.validate_condition(condition, scope);
                self.validate_nested_block(body, scope);
            }
            Stmt::Return(value) => {
                let value_ty = match value {
                    Some(value) => self.infer_expr(value, scope),
                    None => Some(Type::Void),
                };
                if value_ty.as_ref() != Some(&scope.return_ty) {
                    self.error(format!(
                        "Can not convert expression type '{}' to return function type '{}'",
                        Inferred(&value_ty),
                        scope.return_ty
                    ));
                }
            }
        }
    }

    fn validate_condition(&self, condition: &Expr, scope: &mut ScopeContext<'_, 'a>) {
        if self.infer_expr(condition, scope) != Some(Type::Bool) {
            self.error(format!(
                "Condition expression has to have '{}' type",
                Type::Bool
            ));
        }
    }

    /// Resolves the callee of a plain call: class constructor, then method of the enclosing class, then
    /// function, then builtin.
    /// Returns the type of the call expression or `None` if the callee is undefined.
    fn validate_fn_call(&self, call: &FnCall, scope: &mut ScopeContext<'_, 'a>) -> Option<Type> {
        let ident = call.ident.as_str();
        let signature = if let Some(class) = self.classes.get(ident) {
            Signature::of(class.constructor())
        } else if let Some(method) = scope.methods.and_then(|methods| methods.get(ident)) {
            Signature::of(method)
        } else if let Some(function) = self.functions.get(ident) {
            Signature::of(function)
        } else if let Some(builtin) = self.builtins.get(ident) {
            Signature {
                ident: &builtin.ident,
                params: vec![&builtin.param],
                return_ty: Type::Void,
            }
        } else {
            self.error(format!("Call undefined function '{}'", ident));
            return None;
        };

        self.validate_call_args(call, &signature, false, scope);
        Some(signature.return_ty)
    }

    /// Returns the type of the call expression or `None` if the method cannot be resolved.
    fn validate_method_call(
        &self,
        method_call: &MethodCall,
        scope: &mut ScopeContext<'_, 'a>,
    ) -> Option<Type> {
        let object = &method_call.object;
        let class = self.resolve_object(object, scope)?;

        let method_ident = &method_call.call.ident;
        let method = match class.methods.get(method_ident.as_str()) {
            Some(method) => *method,
            None => {
                self.error(format!(
                    "Call undefined method '{}' on object '{}'",
                    method_ident, object
                ));
                return None;
            }
        };

        let signature = Signature::of(method);
        self.validate_call_args(&method_call.call, &signature, true, scope);
        Some(signature.return_ty)
    }

    /// Resolves the class of the variable `object` used with the `.` operator.
    fn resolve_object(
        &self,
        object: &str,
        scope: &ScopeContext<'_, 'a>,
    ) -> Option<&ValidatedClass<'a>> {
        let variable = match scope.get(object) {
            Some(variable) => variable,
            None => {
                self.error(format!("Use of undefined variable '{}'", object));
                return None;
            }
        };
        let class = match &variable.ty {
            Type::Class(class) => self.classes.get(class.as_str()),
            _ => None,
        };
        let class = match class {
            Some(class) => class,
            None => {
                self.error(format!(
                    "Variable '{}' is not an object and does not support '.' operator",
                    object
                ));
                return None;
            }
        };
        if !variable.initialized {
            self.error(format!("Variable '{}' is not initialized", object));
        }
        Some(class)
    }

    /// Checks arity and the type of every argument that has a matching parameter.
    fn validate_call_args(
        &self,
        call: &FnCall,
        signature: &Signature<'_>,
        is_method: bool,
        scope: &mut ScopeContext<'_, 'a>,
    ) {
        let (kind, kind_lower) = if is_method {
            ("Method", "method")
        } else {
            ("Function", "function")
        };

        if signature.params.len() != call.args.len() {
            self.error(format!(
                "{} '{}' has {} parameter(s) but is invoked with {} argument(s)",
                kind,
                signature.ident,
                signature.params.len(),
                call.args.len()
            ));
        }

        for (arg, param_ty) in call.args.iter().zip(&signature.params) {
            let arg_ty = self.infer_expr(arg, scope);
            if arg_ty.as_ref() != Some(*param_ty) {
                self.error(format!(
                    "Argument type '{}' is not assignable to parameter type '{}' in {} '{}' call",
                    Inferred(&arg_ty),
                    param_ty,
                    kind_lower,
                    call.ident
                ));
            }
        }
    }

    /// Infers the type of `expr`, recording an error for every rule it breaks.
    /// Returns `None` if the type cannot be determined.
    fn infer_expr(&self, expr: &Expr, scope: &mut ScopeContext<'_, 'a>) -> Option<Type> {
        match expr {
            Expr::IntLit(_) | Expr::BoolLit(_) | Expr::StringLit(_) => literal_type(expr),
            Expr::Variable(ident) => {
                let variable = match scope.get(ident) {
                    Some(variable) => variable,
                    None => {
                        self.error(format!("Usage of undefined variable '{}'", ident));
                        return None;
                    }
                };
                if !variable.initialized {
                    self.error(format!("Usage of uninitialized variable '{}'", ident));
                }
                Some(variable.ty)
            }
            Expr::PropertyAccess { object, property } => {
                let class = self.resolve_object(object, scope)?;
                match class.property(property) {
                    Some(declaration) => Some(declaration.ty.clone()),
                    None => {
                        self.error(format!(
                            "Can not resolve property '{}' for variable '{}' with type '{}'",
                            property,
                            object,
                            class.ident()
                        ));
                        None
                    }
                }
            }
            Expr::FnCall(call) => self.validate_fn_call(call, scope),
            Expr::MethodCall(method_call) => self.validate_method_call(method_call, scope),
            Expr::Binary { lhs, op, rhs } => {
                let lhs_ty = self.infer_expr(lhs, scope);
                let rhs_ty = self.infer_expr(rhs, scope);
                let is_int = |ty: &Option<Type>| *ty == Some(Type::Int);
                let is_bool = |ty: &Option<Type>| *ty == Some(Type::Bool);

                let (valid, result_ty) = if op.is_arithmetic() {
                    (is_int(&lhs_ty) && is_int(&rhs_ty), Type::Int)
                } else if op.is_logical() {
                    (is_bool(&lhs_ty) && is_bool(&rhs_ty), Type::Bool)
                } else {
                    // relational
                    let valid = lhs_ty == rhs_ty
                        && (is_int(&lhs_ty) || (is_bool(&lhs_ty) && op.is_equality()));
                    (valid, Type::Bool)
                };
                if !valid {
                    self.error(format!(
                        "Can not apply operator '{}' to operands of type '{}' and '{}'",
                        op,
                        Inferred(&lhs_ty),
                        Inferred(&rhs_ty)
                    ));
                }
                Some(result_ty)
            }
            Expr::Not(operand) => {
                let operand_ty = self.infer_expr(operand, scope);
                if operand_ty != Some(Type::Bool) {
                    self.error(format!(
                        "Can not apply operator 'not' to operand of type '{}'",
                        Inferred(&operand_ty)
                    ));
                }
                Some(Type::Bool)
            }
        }
    }
}

/// Type of a literal expression. `None` for any other expression.
fn literal_type(expr: &Expr) -> Option<Type> {
    match expr {
        Expr::IntLit(_) => Some(Type::Int),
        Expr::BoolLit(_) => Some(Type::Bool),
        Expr::StringLit(_) => Some(Type::String),
        _ => None,
    }
}
