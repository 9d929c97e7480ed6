use anyhow::{anyhow, Context, Result};

/// Lines of `.csrg` files that are known to be syntactically broken.
///
/// SpecialSource swallows these silently, so they were never fixed upstream.
const BROKEN_LINES: [&str; 4] = [
	"IDispenseBehavior a(LISourceBlock;LItemStack;)LItemStack; dispense",
	"nv ServerStatisticManager#",
	"ql ServerStatisticManager#",
	"qn ServerStatisticManager#",
];

pub(crate) fn is_comment(line: &str) -> bool {
	line.starts_with('#')
}

/// Splits a line at single spaces, dropping any empty columns at the end.
///
/// A line like `"a b "` therefore has two columns, not three.
pub(crate) fn columns(line: &str) -> Vec<&str> {
	let mut columns: Vec<&str> = line.split(' ').collect();
	while columns.last().is_some_and(|column| column.is_empty()) {
		columns.pop();
	}
	columns
}

/// Returns `true` for lines that can't be parsed as `.csrg` lines, and for lines mentioning a constructor.
pub fn is_broken_line(line: &str) -> bool {
	BROKEN_LINES.contains(&line) || line.contains("<init>")
}

/// Removes all lines for which [`is_broken_line`] returns `true`.
///
/// ```
/// # use pretty_assertions::assert_eq;
/// let lines = vec![
///     "a Entity",
///     "nv ServerStatisticManager#",
///     "Entity <init> ()V <init>",
/// ];
/// assert_eq!(spigot_mapper::strip_broken_lines(lines), vec!["a Entity"]);
/// ```
pub fn strip_broken_lines<S: AsRef<str>>(lines: impl IntoIterator<Item = S>) -> Vec<S> {
	lines.into_iter()
		.filter(|line| !is_broken_line(line.as_ref()))
		.collect()
}

/// A class header of a mapping file in the ProGuard format: `deobfuscated.Name -> obfuscated.Name:`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ClassHeader<'a> {
	pub(crate) deobfuscated: &'a str,
	pub(crate) obfuscated: &'a str,
}

impl<'a> ClassHeader<'a> {
	pub(crate) fn parse(line: &'a str) -> Result<ClassHeader<'a>> {
		let (deobfuscated, rest) = line.split_once(" -> ")
			.with_context(|| anyhow!("class header {line:?} has no ` -> ` separator"))?;
		let obfuscated = rest.strip_suffix(':')
			.with_context(|| anyhow!("class header {line:?} doesn't end in `:`"))?;

		Ok(ClassHeader { deobfuscated, obfuscated })
	}

	/// The deobfuscated name, with `/` as package separator.
	pub(crate) fn deobfuscated_internal(&self) -> String {
		self.deobfuscated.replace('.', "/")
	}

	/// The obfuscated name, with `/` as package separator.
	pub(crate) fn obfuscated_internal(&self) -> String {
		self.obfuscated.replace('.', "/")
	}
}

/// A member line of a mapping file in the ProGuard format.
///
/// The grammar is `[startLine:endLine:]type name -> obfuscated`, where for methods the `type` is the return type and
/// `name` carries the parameter list, like in `1:3:void tick(int,java.lang.String) -> a`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MemberEntry<'a> {
	pub(crate) type_: &'a str,
	pub(crate) name: &'a str,
	pub(crate) obfuscated: &'a str,
}

impl<'a> MemberEntry<'a> {
	pub(crate) fn parse(line: &'a str) -> Result<MemberEntry<'a>> {
		let rest = strip_line_range(line);

		let (type_, rest) = rest.split_once(' ')
			.with_context(|| anyhow!("member line {line:?} has no type"))?;
		let (name, obfuscated) = rest.split_once(" -> ")
			.with_context(|| anyhow!("member line {line:?} has no ` -> ` separator"))?;

		Ok(MemberEntry { type_, name, obfuscated })
	}

	/// Splits a method name like `tick(int,long):12:13` into `tick` and `(int,long)`.
	///
	/// Returns `Ok(None)` for fields.
	pub(crate) fn method_name_and_arguments(&self) -> Result<Option<(&'a str, &'a str)>> {
		let Some(open) = self.name.find('(') else {
			return Ok(None);
		};
		let close = self.name[open..].find(')')
			.with_context(|| anyhow!("method {:?} has no closing parenthesis", self.name))?;

		Ok(Some((&self.name[..open], &self.name[open..=open + close])))
	}
}

/// Removes a leading `\d+:\d+:` line range, if there is one.
fn strip_line_range(line: &str) -> &str {
	fn digits(s: &str) -> Option<&str> {
		let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
		if end == 0 {
			None
		} else {
			Some(&s[end..])
		}
	}

	digits(line)
		.and_then(|rest| rest.strip_prefix(':'))
		.and_then(digits)
		.and_then(|rest| rest.strip_prefix(':'))
		.unwrap_or(line)
}
