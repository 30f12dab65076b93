//! Qualified-name splitting and namespace resolution.
//!
//! Type names coming out of debug information are fully qualified
//! (`App::Gfx::Vec2`) and may carry template arguments that are qualified
//! themselves (`Outer<NS::Inner>`). A `::` only separates namespaces when it
//! is outside every `<...>` pair.

use smallvec::SmallVec;

use super::module::Module;
use super::scope::{ScopeCategory, ScopeId};

/// Byte offsets of every top-level `::` in `name`.
fn top_level_separators(name: &str) -> SmallVec<[usize; 4]>
{
    let bytes = name.as_bytes();
    let mut separators = SmallVec::new();
    let mut nesting = 0i32;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'<' => nesting += 1,
            b'>' => nesting -= 1,
            b':' if nesting == 0 && bytes.get(i + 1) == Some(&b':') => {
                separators.push(i);
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }

    separators
}

/// Split a qualified name into its namespace segments and local name.
///
/// ```rust
/// use symgraph_core::model::split_qualified;
///
/// let (segments, local) = split_qualified("App::Gfx::Vec2");
/// assert_eq!(segments.as_slice(), &["App", "Gfx"]);
/// assert_eq!(local, "Vec2");
///
/// let (segments, local) = split_qualified("Outer<NS::Inner>");
/// assert!(segments.is_empty());
/// assert_eq!(local, "Outer<NS::Inner>");
/// ```
pub fn split_qualified(name: &str) -> (SmallVec<[&str; 4]>, &str)
{
    let mut segments = SmallVec::new();
    let mut start = 0;
    for separator in top_level_separators(name) {
        segments.push(&name[start..separator]);
        start = separator + 2;
    }
    (segments, &name[start..])
}

impl Module
{
    /// Walk `qualified` from the global namespace, creating namespaces on demand.
    ///
    /// Returns the deepest namespace and the local name that remains after the
    /// last top-level `::`. Calling this twice with the same input returns the
    /// same namespace.
    pub fn find_or_create_namespace<'a>(&mut self, qualified: &'a str) -> (ScopeId, &'a str)
    {
        let (segments, local) = split_qualified(qualified);
        let mut current = self.root();

        for segment in segments {
            current = match self.find_child(current, ScopeCategory::Namespace, segment) {
                Some(existing) => existing,
                None => {
                    tracing::trace!(parent = %self.scope(current).full_name(), namespace = segment, "creating namespace");
                    self.add_namespace(current, segment)
                }
            };
        }

        (current, local)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_separators_skip_template_arguments()
    {
        assert_eq!(top_level_separators("A::B<C::D>::E").as_slice(), &[1, 10]);
        assert!(top_level_separators("Vector<NS::Foo>").is_empty());
    }

    #[test]
    fn test_split_without_namespace()
    {
        let (segments, local) = split_qualified("float");
        assert!(segments.is_empty());
        assert_eq!(local, "float");
    }
}
