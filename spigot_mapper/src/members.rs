//! Remapping the fields and methods of a mapping file in the ProGuard format into member lines with public class
//! names.
//!
//! The input is a mapping file like Mojang's `server.txt`:
//! ```text
//! net.minecraft.world.entity.Entity -> a:
//!     int count -> b
//!     1:2:void tick(java.lang.String) -> c
//! ```
//! Each class header switches the current class. Its obfuscated name is resolved to a public name with the
//! [`ClassTable`], and if that fails, all the members up to the next class header are dropped.
//!
//! The output lines have the form `class obfuscated name` for fields and `class obfuscated descriptor name` for
//! methods, where `class` is the public class name and the descriptor uses public class names where possible:
//! ```text
//! net/minecraft/server/Entity b count
//! net/minecraft/server/Entity c (Ljava/lang/String;)V tick
//! ```

use std::fmt::{Display, Formatter};
use anyhow::{anyhow, Context, Result};
use log::{info, trace};
use crate::class_table::{ClassBridgeTable, ClassTable, DirectedClassTable, Direction};
use crate::descriptor;
use crate::lines::{columns, is_comment, ClassHeader, MemberEntry};
use crate::resolver::ClassResolver;

/// Obfuscated field names that are java keywords, and therefore get a `_` appended when only fields are remapped.
const KEYWORD_FIELD_NAMES: [&str; 2] = ["if", "do"];

/// One line of a member mapping file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberLine {
	pub class: String,
	pub obfuscated: String,
	/// The descriptor in the bytecode form, only present for methods.
	pub descriptor: Option<String>,
	pub name: String,
}

impl MemberLine {
	/// Parses a line of three (field) or four (method) space separated columns.
	///
	/// Returns `None` for any other number of columns.
	///
	/// ```
	/// # use pretty_assertions::assert_eq;
	/// use spigot_mapper::members::MemberLine;
	///
	/// let method = MemberLine::parse("Entity b ()V tick").unwrap();
	/// assert_eq!(method.descriptor.as_deref(), Some("()V"));
	/// assert_eq!(method.to_string(), "Entity b ()V tick");
	///
	/// assert_eq!(MemberLine::parse("Entity b"), None);
	/// ```
	pub fn parse(line: &str) -> Option<MemberLine> {
		match columns(line).as_slice() {
			&[class, obfuscated, name] => Some(MemberLine {
				class: class.to_owned(),
				obfuscated: obfuscated.to_owned(),
				descriptor: None,
				name: name.to_owned(),
			}),
			&[class, obfuscated, descriptor, name] => Some(MemberLine {
				class: class.to_owned(),
				obfuscated: obfuscated.to_owned(),
				descriptor: Some(descriptor.to_owned()),
				name: name.to_owned(),
			}),
			_ => None,
		}
	}
}

impl Display for MemberLine {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match &self.descriptor {
			Some(descriptor) => write!(f, "{} {} {} {}", self.class, self.obfuscated, descriptor, self.name),
			None => write!(f, "{} {} {}", self.class, self.obfuscated, self.name),
		}
	}
}

/// Remaps all members of a mapping file in the ProGuard format.
///
/// The output starts with the [header lines][ClassTable::header] of the class table, followed by all member lines,
/// sorted.
///
/// If `include_methods` is `false`, only fields are remapped, and fields with an obfuscated name of `if` or `do` get
/// an `_` appended. Otherwise, the class headers of `lines` are first read into a [`ClassBridgeTable`], which is used
/// for remapping the class names in method descriptors.
///
/// Members are skipped if:
/// - their obfuscated name is the same as their deobfuscated name,
/// - the deobfuscated name of a field contains a `$`,
/// - either name of a method contains a `$`, or
/// - the method is a constructor or static initializer.
///
/// A member line not matching the grammar `[startLine:endLine:]type name -> obfuscated` is an error.
///
/// ```
/// # use pretty_assertions::assert_eq;
/// use spigot_mapper::class_table::ClassTable;
///
/// let classes = ClassTable::load(["# spigot", "a Entity"]);
/// let lines = [
///     "net.minecraft.Entity -> a:",
///     "    1:2:void tick() -> b",
/// ];
///
/// let output = spigot_mapper::members::remap_members(&classes, &lines, true).unwrap();
/// assert_eq!(output, vec!["# spigot", "Entity b ()V tick"]);
/// ```
pub fn remap_members<S: AsRef<str>>(classes: &ClassTable, lines: &[S], include_methods: bool) -> Result<Vec<String>> {
	let bridge = if include_methods {
		ClassBridgeTable::load(lines)
			.context("failed to read class headers")?
	} else {
		ClassBridgeTable::new()
	};

	let mut remapper = Remapper {
		classes: classes.resolver(Direction::ObfuscatedToPublic),
		bridge,
		include_methods,
		current_class: None,
		kept_classes: 0,
		dropped_classes: 0,
	};

	let mut members = Vec::new();
	for (line_number, line) in lines.iter().enumerate() {
		let line_number = line_number + 1;

		let member = remapper.line(line.as_ref())
			.with_context(|| anyhow!("in line {line_number}"))?;

		if let Some(member) = member {
			members.push(member.to_string());
		}
	}

	members.sort();

	info!(
		"remapped {} members of {} classes, dropped {} classes without public name",
		members.len(), remapper.kept_classes, remapper.dropped_classes
	);

	let mut output = classes.header.clone();
	output.extend(members);
	Ok(output)
}

struct Remapper<'a> {
	classes: DirectedClassTable<'a>,
	bridge: ClassBridgeTable,
	include_methods: bool,
	/// The public name of the class whose members are currently read.
	current_class: Option<String>,
	kept_classes: usize,
	dropped_classes: usize,
}

impl Remapper<'_> {
	fn line(&mut self, line: &str) -> Result<Option<MemberLine>> {
		let line = line.trim();
		if line.is_empty() || is_comment(line) {
			return Ok(None);
		}

		if line.ends_with(':') {
			self.enter_class(line)?;
			return Ok(None);
		}

		let Some(class) = &self.current_class else {
			return Ok(None);
		};

		let entry = MemberEntry::parse(line)?;
		match entry.method_name_and_arguments()? {
			Some((name, arguments)) => self.method(class, &entry, name, arguments),
			None => Ok(self.field(class, &entry)),
		}
	}

	fn enter_class(&mut self, line: &str) -> Result<()> {
		let header = ClassHeader::parse(line)?;
		let obfuscated = header.obfuscated_internal();

		self.current_class = self.classes.resolve_class(&obfuscated);

		if self.current_class.is_some() {
			self.kept_classes += 1;
		} else {
			trace!("dropping class {} ({obfuscated}), it has no public name", header.deobfuscated);
			self.dropped_classes += 1;
		}
		Ok(())
	}

	fn field(&self, class: &str, entry: &MemberEntry) -> Option<MemberLine> {
		if entry.name == entry.obfuscated || entry.name.contains('$') {
			trace!("skipping field {class} {} {}", entry.obfuscated, entry.name);
			return None;
		}

		let mut obfuscated = entry.obfuscated.to_owned();
		if !self.include_methods && KEYWORD_FIELD_NAMES.contains(&entry.obfuscated) {
			obfuscated.push('_');
		}

		Some(MemberLine {
			class: class.to_owned(),
			obfuscated,
			descriptor: None,
			name: entry.name.to_owned(),
		})
	}

	fn method(&self, class: &str, entry: &MemberEntry, name: &str, arguments: &str) -> Result<Option<MemberLine>> {
		if !self.include_methods {
			return Ok(None);
		}

		let obfuscated = entry.obfuscated;
		if obfuscated == name || name.contains('$') || obfuscated.contains('$') || matches!(obfuscated, "<init>" | "<clinit>") {
			trace!("skipping method {class} {obfuscated} {name}");
			return Ok(None);
		}

		let descriptor = descriptor::encode(arguments, entry.type_, &self.bridge, &self.classes)
			.with_context(|| anyhow!("failed to convert descriptor of method {name:?}"))?;

		Ok(Some(MemberLine {
			class: class.to_owned(),
			obfuscated: obfuscated.to_owned(),
			descriptor: Some(descriptor),
			name: name.to_owned(),
		}))
	}
}

#[cfg(test)]
mod testing {
	use anyhow::Result;
	use pretty_assertions::assert_eq;
	use crate::class_table::ClassTable;
	use crate::members::{remap_members, MemberLine};

	#[test]
	fn method_without_class_references() -> Result<()> {
		let classes = ClassTable::load(["a Entity"]);
		let lines = [
			"net.minecraft.Entity -> a:",
			"1:2:void tick() -> b",
		];

		assert_eq!(remap_members(&classes, &lines, true)?, vec!["Entity b ()V tick"]);
		Ok(())
	}

	#[test]
	fn keyword_field_names() -> Result<()> {
		let classes = ClassTable::load(["a Entity"]);
		let lines = [
			"net.minecraft.Entity -> a:",
			"    int foo -> do",
			"    int bar -> if",
			"    int baz -> c",
		];

		assert_eq!(remap_members(&classes, &lines, false)?, vec![
			"Entity c baz",
			"Entity do_ foo",
			"Entity if_ bar",
		]);
		// escaping only happens when remapping fields alone
		assert_eq!(remap_members(&classes, &lines, true)?, vec![
			"Entity c baz",
			"Entity do foo",
			"Entity if bar",
		]);
		Ok(())
	}

	#[test]
	fn fields_only_skips_methods() -> Result<()> {
		let classes = ClassTable::load(["a Entity"]);
		let lines = [
			"net.minecraft.Entity -> a:",
			"    int count -> b",
			"    1:2:void tick() -> c",
		];

		assert_eq!(remap_members(&classes, &lines, false)?, vec!["Entity b count"]);
		Ok(())
	}

	#[test]
	fn no_op_and_synthetic_members_are_skipped() -> Result<()> {
		let classes = ClassTable::load(["a Entity"]);
		let lines = [
			"net.minecraft.Entity -> a:",
			"    int same -> same",
			"    int this$0 -> b",
			"    void equals(java.lang.Object) -> equals",
			"    void lambda$tick$0() -> c",
			"    void tick() -> d$e",
			"    void <init>() -> <init>",
			"    void <clinit>() -> <clinit>",
			"    void stop() -> f",
		];

		let output = remap_members(&classes, &lines, true)?;

		assert_eq!(output, vec!["Entity f ()V stop"]);
		assert!(output.iter().all(|line| {
			let member = MemberLine::parse(line);
			member.is_some_and(|member| member.obfuscated != member.name)
		}));
		Ok(())
	}

	#[test]
	fn unresolved_classes_drop_their_members() -> Result<()> {
		let classes = ClassTable::load(["a Entity"]);
		let lines = [
			"net.minecraft.Unknown -> z:",
			"    int count -> b",
			"net.minecraft.Entity -> a:",
			"    int count -> b",
			"net.minecraft.Entity$Inner -> a$c:",
			"    int size -> b",
			"com.mojang.Other -> y$c:",
			"    int size -> b",
		];

		assert_eq!(remap_members(&classes, &lines, true)?, vec![
			"Entity b count",
			"Entity$c b size",
		]);
		Ok(())
	}

	#[test]
	fn descriptors_use_public_names() -> Result<()> {
		let classes = ClassTable::load([
			"a net/minecraft/server/Entity",
			"b net/minecraft/server/World",
		]);
		let lines = [
			"net.minecraft.world.entity.Entity -> a:",
			"    3:4:net.minecraft.world.level.Level level(net.minecraft.world.entity.Entity$RemovalReason,int[]):77:78 -> c",
			"net.minecraft.world.level.Level -> b:",
			"    java.util.List entities(com.mojang.math.Vector3f) -> d",
			"com.mojang.math.Vector3f -> x:",
			"net.minecraft.world.entity.Entity$RemovalReason -> a$b:",
		];

		assert_eq!(remap_members(&classes, &lines, true)?, vec![
			"net/minecraft/server/Entity c (Lnet/minecraft/server/Entity$b;[I)Lnet/minecraft/server/World; level",
			"net/minecraft/server/World d (Lcom/mojang/math/Vector3f;)Ljava/util/List; entities",
		]);
		Ok(())
	}

	#[test]
	fn header_first_and_sorted() -> Result<()> {
		let classes = ClassTable::load([
			"# z header",
			"b World",
			"# a header",
			"a Entity",
		]);
		let lines = [
			"net.minecraft.World -> b:",
			"    int z -> c",
			"    int a -> d",
			"net.minecraft.Entity -> a:",
			"    int y -> e",
		];

		let output = remap_members(&classes, &lines, false)?;

		assert_eq!(output, vec![
			"# z header",
			"# a header",
			"Entity e y",
			"World c z",
			"World d a",
		]);
		assert_eq!(remap_members(&classes, &lines, false)?, output);
		Ok(())
	}

	#[test]
	fn comments_and_members_without_class() -> Result<()> {
		let classes = ClassTable::load(["a Entity"]);
		let lines = [
			"# compiler: R8",
			"    int orphan -> z",
			"",
			"net.minecraft.Entity -> a:",
			"# {\"fileName\":\"Entity.java\",\"id\":\"sourceFile\"}",
			"    int count -> b",
			"    # {\"id\":\"com.android.tools.r8.synthesized\"}",
		];

		assert_eq!(remap_members(&classes, &lines, true)?, vec!["Entity b count"]);
		Ok(())
	}

	#[test]
	fn invalid_member_line() {
		let classes = ClassTable::load(["a Entity"]);
		let lines = [
			"net.minecraft.Entity -> a:",
			"    int count -> b",
			"    garbage",
		];

		let error = format!("{:#}", remap_members(&classes, &lines, false).unwrap_err());
		assert!(error.contains("in line 3"), "{error}");
	}

	#[test]
	fn invalid_descriptor() {
		let classes = ClassTable::load(["a Entity"]);
		let lines = [
			"net.minecraft.Entity -> a:",
			"    void tick(void) -> b",
		];

		let error = format!("{:#}", remap_members(&classes, &lines, true).unwrap_err());
		assert!(error.contains("in line 2"), "{error}");
	}
}
