//! On-demand template instantiation.
//!
//! Templates are registered as bare placeholders (`Vector`). An instance
//! only comes into existence when a field, parameter or return type refers to
//! it (`Vector<Vec2>`); it is then created next to its template, registered
//! under the literal instantiated name and given a minimal method pass.

use smallvec::SmallVec;

use super::SymbolGraphBuilder;
use crate::model::{NewType, ScopeId, TemplateInstanceData, TypeKind};
use crate::symbols::{SymbolId, SymbolSource};

/// Type arguments modeled per instance.
pub const MAX_TEMPLATE_ARGUMENTS: usize = 2;

/// Outcome of [`SymbolGraphBuilder::instantiate_template`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Instantiation
{
    /// The base name isn't a registered template.
    NotTemplate,
    /// The instance exists (possibly created by this call).
    Ready(ScopeId),
    /// The first argument doesn't resolve.
    Failed,
}

/// Split the argument list of `name` at top-level commas.
///
/// Only the first [`MAX_TEMPLATE_ARGUMENTS`] arguments are returned, trimmed.
///
/// ```rust
/// use symgraph_core::builder::template_arguments;
///
/// let args = template_arguments("Map<Key, Pair<int, float>, Alloc>");
/// assert_eq!(args.as_slice(), &["Key", "Pair<int, float>"]);
/// assert!(template_arguments("Plain").is_empty());
/// ```
pub fn template_arguments(name: &str) -> SmallVec<[&str; MAX_TEMPLATE_ARGUMENTS]>
{
    let mut arguments = SmallVec::new();
    let Some(open) = name.find('<') else {
        return arguments;
    };
    let close = name.rfind('>').filter(|&close| close > open).unwrap_or(name.len());
    let list = &name[open + 1..close];

    let mut nesting = 0i32;
    let mut start = 0;
    for (i, c) in list.char_indices() {
        match c {
            '<' => nesting += 1,
            '>' => nesting -= 1,
            ',' if nesting == 0 => {
                arguments.push(list[start..i].trim());
                start = i + 1;
                if arguments.len() == MAX_TEMPLATE_ARGUMENTS {
                    return arguments;
                }
            }
            _ => {}
        }
    }
    let last = list[start..].trim();
    if !last.is_empty() {
        arguments.push(last);
    }
    arguments
}

impl<S: SymbolSource + ?Sized> SymbolGraphBuilder<'_, S>
{
    /// Find or create the instance named `type_name`.
    ///
    /// `type_symbol` is the instantiated class symbol; its size and member
    /// functions describe the instance.
    pub(super) fn instantiate_template(&mut self, type_name: &str, type_symbol: SymbolId) -> Instantiation
    {
        let Some(open) = type_name.find('<') else {
            return Instantiation::NotTemplate;
        };
        let Some(template) = self.registry.get(&type_name[..open]) else {
            return Instantiation::NotTemplate;
        };
        if !matches!(self.module.type_info(template).map(|info| &info.kind), Some(TypeKind::Template)) {
            return Instantiation::NotTemplate;
        }

        let arguments = template_arguments(type_name);
        let Some(first_argument) = arguments.first().and_then(|argument| self.registry.get(argument)) else {
            tracing::debug!(instance = type_name, "first template argument is not reflected");
            return Instantiation::Failed;
        };
        let second_argument = arguments.get(1).and_then(|argument| self.registry.get(argument));

        if let Some(existing) = self.registry.get(type_name) {
            return Instantiation::Ready(existing);
        }

        let Some(parent) = self.module.scope(template).parent() else {
            return Instantiation::Failed;
        };
        let parent_name = self.module.scope(parent).full_name().text();
        let local_name = if parent_name.is_empty() {
            type_name
        } else {
            type_name
                .strip_prefix(parent_name)
                .and_then(|rest| rest.strip_prefix("::"))
                .unwrap_or(type_name)
        };

        let _span = tracing::debug_span!("template_instance", instance = type_name).entered();

        let size = self.source.symbol(type_symbol).map_or(0, |symbol| symbol.length);
        let type_of_address = self.type_of_address(type_name, type_name);
        let instance = self.module.add_type(parent, local_name, NewType {
            size,
            type_of_address,
            kind: TypeKind::TemplateInstance(TemplateInstanceData {
                template,
                first_argument,
                second_argument,
            }),
        });
        if let Some(info) = self.module.type_info_mut(instance) {
            info.minimal_reflection = true;
        }

        // The name was checked above; a failure here means the map changed under us.
        let _ = self.registry.insert(type_name, instance);
        self.symbols.insert(instance, type_symbol);
        self.stats.template_instances += 1;
        tracing::debug!(instance = type_name, "created template instance");

        self.reflect_methods(instance);
        Instantiation::Ready(instance)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_arguments_are_trimmed_and_capped()
    {
        assert_eq!(template_arguments("Vector< Foo >").as_slice(), &["Foo"]);
        assert_eq!(template_arguments("Pair<A,B>").as_slice(), &["A", "B"]);
        assert_eq!(template_arguments("Tuple<A, B, C>").len(), 2);
    }

    #[test]
    fn test_nested_commas_stay_in_one_argument()
    {
        assert_eq!(
            template_arguments("std::vector<Pair<int, int>, std::allocator<Pair<int, int> > >").as_slice(),
            &["Pair<int, int>", "std::allocator<Pair<int, int> >"]
        );
    }

    #[test]
    fn test_empty_argument_list()
    {
        assert!(template_arguments("Empty<>").is_empty());
    }
}
