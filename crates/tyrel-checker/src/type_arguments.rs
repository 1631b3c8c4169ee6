//! Type arguments against type parameter constraints.

use crate::state::Checker;
use tyrel_binder::{NodeIndex, TypeNode, symbol_flags};
use tyrel_common::diagnostics::{Diagnostic, diagnostic_codes};
use tyrel_solver::{TypeId, TypeMapper, instantiate_type};

impl Checker {
    /// Check every reference inside `annotation` whose written type
    /// arguments must satisfy the constraints of the referenced declaration.
    pub(crate) fn check_type_arguments_in(
        &self,
        annotation: &TypeNode,
        location: NodeIndex,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let locals = annotation.local_type_parameter_names();
        let mut references = Vec::new();
        annotation.for_each_reference(&mut |reference| references.push(reference));
        for reference in references {
            let TypeNode::Reference {
                name,
                type_arguments,
            } = reference
            else {
                continue;
            };
            // Arguments naming a nested type parameter only resolve inside their scope.
            if type_arguments.is_empty() || type_arguments.iter().any(|arg| mentions_any(arg, &locals)) {
                continue;
            }
            self.check_reference_arguments(name, type_arguments, location, diagnostics);
        }
    }

    fn check_reference_arguments(
        &self,
        name: &[String],
        type_arguments: &[TypeNode],
        location: NodeIndex,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let env = self.env();
        let Some(symbol) = env
            .binder()
            .resolve_qualified_name(env.arena(), name, location, symbol_flags::TYPE)
        else {
            return;
        };
        let params = env.type_params_of(symbol);
        if params.is_empty() {
            return;
        }
        let args: Vec<TypeId> = type_arguments
            .iter()
            .map(|arg| env.get_type_from_type_node(arg, location))
            .collect();
        let count = params.len().min(args.len());
        let mapper = TypeMapper::new(&params[..count], &args[..count]);

        for (&param, &arg) in params.iter().zip(&args) {
            let Some(constraint) = env.interner().type_param_constraint(param) else {
                continue;
            };
            if arg.is_error() {
                continue;
            }
            let constraint = instantiate_type(env, constraint, &mapper);
            if self.is_type_assignable_to(arg, constraint) {
                continue;
            }
            let arg_text = self.type_to_string(arg);
            let constraint_text = self.type_to_string(constraint);
            diagnostics.push(Diagnostic::from_code(
                location.0,
                diagnostic_codes::TYPE_DOES_NOT_SATISFY_CONSTRAINT,
                &[arg_text.as_str(), constraint_text.as_str()],
            ));
        }
    }
}

fn mentions_any(node: &TypeNode, names: &[&str]) -> bool {
    if names.is_empty() {
        return false;
    }
    let mut found = false;
    node.for_each_reference(&mut |reference| {
        if let TypeNode::Reference { name, .. } = reference {
            if let [single] = name.as_slice() {
                found |= names.contains(&single.as_str());
            }
        }
    });
    found
}

#[cfg(test)]
#[path = "../tests/type_arguments_tests.rs"]
mod tests;
