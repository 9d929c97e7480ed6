//! Resolving class names from one naming domain into another.
//!
//! The class tables only list top level classes (and sometimes some inner classes). An inner class not listed by
//! itself is resolved by resolving its enclosing class, and appending the inner class suffix again.
//!
//! For example with the table `{ "a": "Entity" }`, `a$b` resolves to `Entity$b`.

/// Something that can look up class names, one class at a time.
///
/// Implementations only need to implement [`ClassResolver::lookup_class`]; the other methods build on top of it.
pub trait ClassResolver {
	/// Looks up the class name, without looking at enclosing classes.
	///
	/// If there's no entry for the class, returns `None`.
	fn lookup_class(&self, class: &str) -> Option<&str>;

	/// Resolves a class name, falling back to the enclosing classes for inner classes.
	///
	/// If neither the class nor any of its enclosing classes has an entry, returns `None`.
	///
	/// Do not implement this yourself.
	fn resolve_class(&self, class: &str) -> Option<String> {
		resolve(self, class)
	}

	/// Resolves a class name, if it can't be resolved, returns the old one.
	///
	/// Do not implement this yourself.
	fn map_class(&self, class: &str) -> String {
		self.resolve_class(class)
			.unwrap_or_else(|| class.to_owned())
	}
}

/// Resolves the class name, peeling off one `$`-delimited inner class segment at a time until some enclosing class
/// has an entry.
///
/// ```
/// # use pretty_assertions::assert_eq;
/// use spigot_mapper::class_table::{ClassTable, Direction};
/// use spigot_mapper::resolver::ClassResolver;
///
/// let table = ClassTable::load(["a Entity", "a$b Entity$Inner"]);
/// let resolver = table.resolver(Direction::ObfuscatedToPublic);
///
/// assert_eq!(resolver.resolve_class("a"), Some("Entity".to_owned()));
/// assert_eq!(resolver.resolve_class("a$c"), Some("Entity$c".to_owned()));
/// assert_eq!(resolver.resolve_class("a$b$c"), Some("Entity$Inner$c".to_owned()));
/// assert_eq!(resolver.resolve_class("b$c"), None);
/// ```
pub fn resolve(resolver: &(impl ClassResolver + ?Sized), class: &str) -> Option<String> {
	if let Some(resolved) = resolver.lookup_class(class) {
		return Some(resolved.to_owned());
	}

	let mut outer = class;
	// innermost segment first, each one still with its leading `$`
	let mut inner = Vec::new();

	while let Some(index) = outer.rfind('$') {
		inner.push(&outer[index..]);
		outer = &outer[..index];

		if let Some(resolved) = resolver.lookup_class(outer) {
			let mut resolved = resolved.to_owned();
			for segment in inner.iter().rev() {
				resolved.push_str(segment);
			}
			return Some(resolved);
		}
	}

	None
}
