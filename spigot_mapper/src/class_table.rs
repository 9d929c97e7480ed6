//! The class name tables all the other operations resolve against.
//!
//! There are two of them:
//! - The [`ClassTable`], mapping obfuscated class names to public class names and back. This is read from a
//!   `.csrg` file of two columns, like Spigot's `bukkit-cl.csrg`:
//!   ```text
//!   # some header comment
//!   a net/minecraft/server/Entity
//!   b net/minecraft/server/World
//!   ```
//! - The [`ClassBridgeTable`], mapping deobfuscated class names to obfuscated ones. This is read from the class
//!   headers of a mapping file in the ProGuard format, like Mojang's `server.txt`:
//!   ```text
//!   net.minecraft.world.entity.Entity -> a:
//!   ```
//!
//! All class names are stored with `/` as the package separator.

use anyhow::{anyhow, bail, Context, Result};
use indexmap::IndexMap;
use indexmap::map::Entry;
use log::{debug, info, warn};
use crate::lines::{columns, is_comment, ClassHeader};
use crate::resolver::ClassResolver;

/// The direction of a lookup in a [`ClassTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
	/// From the obfuscated class name to the public one.
	ObfuscatedToPublic,
	/// From the public class name back to the obfuscated one.
	PublicToObfuscated,
}

/// A one-to-one mapping between obfuscated and public class names, together with the header comments of the file
/// it was read from.
///
/// Both directions are stored as separate maps. Which one is used is always explicitly chosen by a [`Direction`].
#[derive(Debug, Clone, Default)]
pub struct ClassTable {
	/// The comment lines (starting with `#`) in the order they were read in.
	pub header: Vec<String>,
	obfuscated_to_public: IndexMap<String, String>,
	public_to_obfuscated: IndexMap<String, String>,
}

impl ClassTable {
	pub fn new() -> ClassTable {
		ClassTable::default()
	}

	/// Reads a class table from the lines of a two column `.csrg` file.
	///
	/// Lines starting with `#` are kept as [header lines][ClassTable::header]. Lines that don't have exactly two
	/// columns, as well as lines that would break the one-to-one mapping, are skipped.
	///
	/// ```
	/// # use pretty_assertions::assert_eq;
	/// use spigot_mapper::class_table::{ClassTable, Direction};
	///
	/// let table = ClassTable::load([
	///     "# header",
	///     "a Entity",
	///     "not a class line",
	///     "b World",
	/// ]);
	///
	/// assert_eq!(table.header, vec!["# header"]);
	/// assert_eq!(table.len(), 2);
	/// assert_eq!(table.get("a", Direction::ObfuscatedToPublic), Some("Entity"));
	/// assert_eq!(table.get("World", Direction::PublicToObfuscated), Some("b"));
	/// ```
	pub fn load<S: AsRef<str>>(lines: impl IntoIterator<Item = S>) -> ClassTable {
		let mut table = ClassTable::new();

		for (line_number, line) in lines.into_iter().enumerate() {
			let line = line.as_ref();
			let line_number = line_number + 1;

			if is_comment(line) {
				table.header.push(line.to_owned());
				continue;
			}

			match columns(line).as_slice() {
				&[obfuscated, public] => {
					if let Err(e) = table.add_class(obfuscated.to_owned(), public.to_owned()) {
						warn!("skipping line {line_number}: {e:#}");
					}
				},
				_ => {
					if !line.trim().is_empty() {
						debug!("skipping line {line_number}, it doesn't have two columns: {line:?}");
					}
				},
			}
		}

		info!("read {} classes and {} header lines", table.len(), table.header.len());

		table
	}

	/// Adds a class mapping.
	///
	/// Fails if either the obfuscated or the public name already has an entry.
	pub fn add_class(&mut self, obfuscated: String, public: String) -> Result<()> {
		if let Some(existing) = self.public_to_obfuscated.get(&public) {
			bail!("cannot add {obfuscated:?} -> {public:?}, as {existing:?} already maps to {public:?}");
		}

		match self.obfuscated_to_public.entry(obfuscated) {
			Entry::Occupied(e) => {
				bail!("cannot add {:?} -> {public:?}, as there's already one: {:?}", e.key(), e.get());
			},
			Entry::Vacant(e) => {
				self.public_to_obfuscated.insert(public.clone(), e.key().clone());
				e.insert(public);
			},
		}

		Ok(())
	}

	/// Looks up a class name in the given direction, without looking at enclosing classes.
	///
	/// For resolving inner classes, use [`ClassTable::resolve`].
	pub fn get(&self, class: &str, direction: Direction) -> Option<&str> {
		let map = match direction {
			Direction::ObfuscatedToPublic => &self.obfuscated_to_public,
			Direction::PublicToObfuscated => &self.public_to_obfuscated,
		};
		map.get(class).map(String::as_str)
	}

	/// Resolves a class name in the given direction, falling back to enclosing classes for inner classes.
	///
	/// See [`crate::resolver::resolve`] for the details.
	pub fn resolve(&self, class: &str, direction: Direction) -> Option<String> {
		self.resolver(direction).resolve_class(class)
	}

	/// Creates a [`ClassResolver`] looking up class names in the given direction.
	pub fn resolver(&self, direction: Direction) -> DirectedClassTable<'_> {
		DirectedClassTable { table: self, direction }
	}

	/// Iterates over all `(obfuscated, public)` pairs, in the order they were added.
	pub fn classes(&self) -> impl Iterator<Item = (&str, &str)> {
		self.obfuscated_to_public.iter()
			.map(|(obfuscated, public)| (obfuscated.as_str(), public.as_str()))
	}

	pub fn len(&self) -> usize {
		self.obfuscated_to_public.len()
	}

	pub fn is_empty(&self) -> bool {
		self.obfuscated_to_public.is_empty()
	}
}

/// A [`ClassTable`] with a fixed [`Direction`], created by [`ClassTable::resolver`].
#[derive(Debug, Clone, Copy)]
pub struct DirectedClassTable<'a> {
	table: &'a ClassTable,
	direction: Direction,
}

impl ClassResolver for DirectedClassTable<'_> {
	fn lookup_class(&self, class: &str) -> Option<&str> {
		self.table.get(class, self.direction)
	}
}

/// A mapping from deobfuscated class names to obfuscated class names.
#[derive(Debug, Clone, Default)]
pub struct ClassBridgeTable {
	deobfuscated_to_obfuscated: IndexMap<String, String>,
}

impl ClassBridgeTable {
	pub fn new() -> ClassBridgeTable {
		ClassBridgeTable::default()
	}

	/// Reads the class headers (lines ending in `:`) of a mapping file in the ProGuard format.
	///
	/// Member lines and comment lines are ignored. A class header without the ` -> ` separator is an error.
	///
	/// ```
	/// # use pretty_assertions::assert_eq;
	/// use spigot_mapper::class_table::ClassBridgeTable;
	///
	/// let table = ClassBridgeTable::load([
	///     "# {\"id\":\"sourceFile\",\"fileName\":\"Entity.java\"}",
	///     "net.minecraft.world.entity.Entity -> a:",
	///     "    int count -> b",
	/// ]).unwrap();
	///
	/// assert_eq!(table.get("net/minecraft/world/entity/Entity"), Some("a"));
	/// ```
	pub fn load<S: AsRef<str>>(lines: impl IntoIterator<Item = S>) -> Result<ClassBridgeTable> {
		let mut table = ClassBridgeTable::new();

		for (line_number, line) in lines.into_iter().enumerate() {
			let line = line.as_ref().trim();
			let line_number = line_number + 1;

			if is_comment(line) || !line.ends_with(':') {
				continue;
			}

			let header = ClassHeader::parse(line)
				.with_context(|| anyhow!("in line {line_number}"))?;

			table.add_class(header.deobfuscated_internal(), header.obfuscated_internal());
		}

		debug!("read {} class headers", table.len());

		Ok(table)
	}

	/// Adds a class mapping, replacing an older one for the same deobfuscated name.
	pub fn add_class(&mut self, deobfuscated: String, obfuscated: String) {
		if let Some(old) = self.deobfuscated_to_obfuscated.insert(deobfuscated, obfuscated) {
			warn!("replaced class mapping to {old:?}");
		}
	}

	/// Looks up a deobfuscated class name, without looking at enclosing classes.
	pub fn get(&self, class: &str) -> Option<&str> {
		self.deobfuscated_to_obfuscated.get(class)
			.map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.deobfuscated_to_obfuscated.len()
	}

	pub fn is_empty(&self) -> bool {
		self.deobfuscated_to_obfuscated.is_empty()
	}
}

impl ClassResolver for ClassBridgeTable {
	fn lookup_class(&self, class: &str) -> Option<&str> {
		self.get(class)
	}
}
