//! Combining the class table and member files into one mapping file with obfuscated class names.

use anyhow::{anyhow, Context, Result};
use log::{debug, info, trace};
use crate::class_table::{ClassTable, DirectedClassTable, Direction};
use crate::descriptor;
use crate::lines::is_comment;
use crate::members::MemberLine;
use crate::resolver::ClassResolver;

/// Combines the class table with member files (as written by [`crate::members::remap_members`]).
///
/// The output consists of:
/// - the [header lines][ClassTable::header] of the class table,
/// - every class of the class table, as `obfuscated public`, in the order they were read in, and
/// - every member line of the member files, in the given order, with the class name and the class names in the
///   descriptor mapped back from public to obfuscated names.
///
/// The output isn't sorted. Comment lines and lines that don't have three or four columns are skipped, and so are
/// member lines whose class can't be mapped back. A descriptor that can't be parsed is an error.
///
/// ```
/// # use pretty_assertions::assert_eq;
/// use spigot_mapper::class_table::ClassTable;
///
/// let classes = ClassTable::load(["# spigot", "a Entity", "b World"]);
/// let members = [
///     vec!["# spigot", "Entity c (LWorld;)V tick"],
///     vec!["World d count"],
/// ];
///
/// let output = spigot_mapper::combine::combine(&classes, &members).unwrap();
/// assert_eq!(output, vec![
///     "# spigot",
///     "a Entity",
///     "b World",
///     "a c (Lb;)V tick",
///     "b d count",
/// ]);
/// ```
pub fn combine<F: AsRef<[S]>, S: AsRef<str>>(classes: &ClassTable, member_files: &[F]) -> Result<Vec<String>> {
	let to_obfuscated = classes.resolver(Direction::PublicToObfuscated);

	let mut output = classes.header.clone();
	output.extend(classes.classes().map(|(obfuscated, public)| format!("{obfuscated} {public}")));

	for (file_number, lines) in member_files.iter().enumerate() {
		let file_number = file_number + 1;
		let mut members = 0;

		for (line_number, line) in lines.as_ref().iter().enumerate() {
			let line_number = line_number + 1;
			let line = line.as_ref().trim();

			if line.is_empty() || is_comment(line) {
				continue;
			}

			let Some(member) = MemberLine::parse(line) else {
				debug!("skipping line {line_number} of member file {file_number}, it doesn't have three or four columns: {line:?}");
				continue;
			};

			let member = obfuscate_member(member, &to_obfuscated)
				.with_context(|| anyhow!("in line {line_number} of member file {file_number}"))?;

			if let Some(member) = member {
				output.push(member.to_string());
				members += 1;
			}
		}

		info!("combined {members} members from member file {file_number}");
	}

	Ok(output)
}

/// Maps the class name and the descriptor of a member line from public to obfuscated names.
///
/// Returns `None` if the class name can't be mapped.
fn obfuscate_member(member: MemberLine, to_obfuscated: &DirectedClassTable) -> Result<Option<MemberLine>> {
	let Some(class) = to_obfuscated.resolve_class(&member.class) else {
		trace!("dropping member {member}, its class has no obfuscated name");
		return Ok(None);
	};

	let descriptor = member.descriptor.as_deref()
		.map(|desc| descriptor::remap(desc, to_obfuscated))
		.transpose()?;

	Ok(Some(MemberLine { class, descriptor, ..member }))
}
