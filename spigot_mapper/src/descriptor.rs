//! Method descriptors, in both textual forms they appear in.
//!
//! - The bytecode form, used in class files and in `.csrg` files: `(Ljava/lang/String;[I)V`.
//! - The verbose form, used in mapping files in the ProGuard format: the parameter list `(java.lang.String,int[])`,
//!   with the return type `void` in front of the method name. Written in one piece, this is
//!   `(java.lang.String,int[])void`.
//!
//! Parsing the verbose form splits the parameter list at every comma. This is only correct since type names in these
//! files never contain commas (there are no generics in them).
//!
//! Only class names are ever changed when remapping descriptors, primitives and array dimensions are kept as they are.

use std::iter::Peekable;
use std::str::Chars;
use anyhow::{anyhow, bail, Context, Result};
use crate::resolver::ClassResolver;

/// A primitive type.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Primitive {
	/// A `byte`, `B`.
	Byte,
	/// A `char`, `C`.
	Char,
	/// A `double`, `D`.
	Double,
	/// A `float`, `F`.
	Float,
	/// An `int`, `I`.
	Int,
	/// A `long`, `J`.
	Long,
	/// A `short`, `S`.
	Short,
	/// A `boolean`, `Z`.
	Boolean,
}

impl Primitive {
	const ALL: [Primitive; 8] = [
		Primitive::Byte,
		Primitive::Char,
		Primitive::Double,
		Primitive::Float,
		Primitive::Int,
		Primitive::Long,
		Primitive::Short,
		Primitive::Boolean,
	];

	/// The character used in the bytecode form.
	pub fn code(self) -> char {
		match self {
			Primitive::Byte => 'B',
			Primitive::Char => 'C',
			Primitive::Double => 'D',
			Primitive::Float => 'F',
			Primitive::Int => 'I',
			Primitive::Long => 'J',
			Primitive::Short => 'S',
			Primitive::Boolean => 'Z',
		}
	}

	/// The java keyword, used in the verbose form.
	pub fn keyword(self) -> &'static str {
		match self {
			Primitive::Byte => "byte",
			Primitive::Char => "char",
			Primitive::Double => "double",
			Primitive::Float => "float",
			Primitive::Int => "int",
			Primitive::Long => "long",
			Primitive::Short => "short",
			Primitive::Boolean => "boolean",
		}
	}

	fn from_code(code: char) -> Option<Primitive> {
		Primitive::ALL.into_iter().find(|primitive| primitive.code() == code)
	}

	fn from_keyword(keyword: &str) -> Option<Primitive> {
		Primitive::ALL.into_iter().find(|primitive| primitive.keyword() == keyword)
	}
}

/// The element type of a [`Type`]: for arrays what's inside, for anything else the type itself.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ElementType {
	Primitive(Primitive),
	/// An instance of the class, given with `/` as package separator.
	Object(String),
}

/// A type of a parameter or of a return value.
///
/// A `dimension` of zero means that the type isn't an array.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Type {
	pub dimension: u8,
	pub element: ElementType,
}

impl Type {
	pub fn primitive(primitive: Primitive) -> Type {
		Type { dimension: 0, element: ElementType::Primitive(primitive) }
	}

	pub fn object(class: impl Into<String>) -> Type {
		Type { dimension: 0, element: ElementType::Object(class.into()) }
	}

	pub fn array(dimension: u8, element: ElementType) -> Type {
		Type { dimension, element }
	}

	fn write(&self, s: &mut String) {
		for _ in 0..self.dimension {
			s.push('[');
		}
		match &self.element {
			ElementType::Primitive(primitive) => s.push(primitive.code()),
			ElementType::Object(class) => {
				s.push('L');
				s.push_str(class);
				s.push(';');
			},
		}
	}

	fn write_verbose(&self, s: &mut String) {
		match &self.element {
			ElementType::Primitive(primitive) => s.push_str(primitive.keyword()),
			ElementType::Object(class) => s.push_str(&class.replace('/', ".")),
		}
		for _ in 0..self.dimension {
			s.push_str("[]");
		}
	}
}

// The grammar for descriptors in the bytecode form is:
//   MethodDescriptor:
//     "(" FieldType* ")" ReturnDescriptor
//
//   ReturnDescriptor:
//     FieldType | "V"
//
//   FieldType:
//     "B" | "C" | "D" | "F" | "I" | "J" | "S" | "Z" |
//     "L" ClassName ";" |
//     "[" FieldType
fn read_field_type(chars: &mut Peekable<Chars>) -> Result<Type> {
	let mut dimension: u8 = 0;
	while chars.next_if_eq(&'[').is_some() {
		dimension = dimension.checked_add(1)
			.context("array dimension is larger than 255")?;
	}

	let char = chars.next().context("unexpected abrupt ending of descriptor")?;
	let element = if char == 'L' {
		let mut class = String::new();
		loop {
			match chars.next() {
				Some(';') => break,
				Some(char) => class.push(char),
				None => bail!("unexpected abrupt ending of descriptor, missing `;` after {class:?}"),
			}
		}
		if class.is_empty() {
			bail!("empty class name in descriptor");
		}
		ElementType::Object(class)
	} else if let Some(primitive) = Primitive::from_code(char) {
		ElementType::Primitive(primitive)
	} else {
		bail!("unexpected char {char:?} in descriptor");
	};

	Ok(Type::array(dimension, element))
}

fn read_verbose_type(token: &str) -> Result<Type> {
	let mut element = token;
	let mut dimension: u8 = 0;
	while let Some(inner) = element.strip_suffix("[]") {
		element = inner;
		dimension = dimension.checked_add(1)
			.with_context(|| anyhow!("array dimension of {token:?} is larger than 255"))?;
	}

	let element = if let Some(primitive) = Primitive::from_keyword(element) {
		ElementType::Primitive(primitive)
	} else if element.is_empty() {
		bail!("missing type name in {token:?}");
	} else if element == "void" {
		bail!("`void` is only allowed as return type, got {token:?}");
	} else {
		ElementType::Object(element.replace('.', "/"))
	};

	Ok(Type::array(dimension, element))
}

/// A parsed method descriptor.
///
/// A `return_descriptor` of `None` stands for `void`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MethodDescriptor {
	pub parameter_descriptors: Vec<Type>,
	pub return_descriptor: Option<Type>,
}

impl MethodDescriptor {
	/// Parses a method descriptor in the bytecode form.
	///
	/// ```
	/// # use pretty_assertions::assert_eq;
	/// use spigot_mapper::descriptor::{ElementType, MethodDescriptor, Primitive, Type};
	///
	/// assert_eq!(
	///     MethodDescriptor::parse("(I[[Ljava/lang/String;)V").unwrap(),
	///     MethodDescriptor {
	///         parameter_descriptors: vec![
	///             Type::primitive(Primitive::Int),
	///             Type::array(2, ElementType::Object("java/lang/String".to_owned())),
	///         ],
	///         return_descriptor: None,
	///     }
	/// );
	/// ```
	pub fn parse(desc: &str) -> Result<MethodDescriptor> {
		let mut chars = desc.chars().peekable();

		if chars.next_if_eq(&'(').is_none() {
			bail!("method descriptor {desc:?} doesn't start with '('");
		}

		let mut parameter_descriptors = Vec::new();
		while chars.next_if_eq(&')').is_none() {
			let descriptor = read_field_type(&mut chars)
				.with_context(|| anyhow!("failed to read parameter descriptor of {desc:?}"))?;
			parameter_descriptors.push(descriptor);
		}

		let return_descriptor = if chars.next_if_eq(&'V').is_some() {
			None
		} else {
			let descriptor = read_field_type(&mut chars)
				.with_context(|| anyhow!("failed to read return descriptor of {desc:?}"))?;
			Some(descriptor)
		};

		if chars.peek().is_some() {
			bail!("expected end of method descriptor {desc:?}, got {:?} remaining", String::from_iter(chars));
		}

		Ok(MethodDescriptor { parameter_descriptors, return_descriptor })
	}

	/// Writes the method descriptor in the bytecode form.
	///
	/// The inverse of this function is [`MethodDescriptor::parse`].
	pub fn write(&self) -> String {
		let mut s = String::new();
		s.push('(');
		for parameter_descriptor in &self.parameter_descriptors {
			parameter_descriptor.write(&mut s);
		}
		s.push(')');
		match &self.return_descriptor {
			Some(return_descriptor) => return_descriptor.write(&mut s),
			None => s.push('V'),
		}
		s
	}

	/// Parses a method descriptor in the verbose form, from the parameter list and the return type.
	///
	/// The parameter list includes the parentheses. Empty parameters (like in `(int,)`) are ignored.
	///
	/// ```
	/// # use pretty_assertions::assert_eq;
	/// use spigot_mapper::descriptor::MethodDescriptor;
	///
	/// let desc = MethodDescriptor::from_verbose("(java.lang.String,int)", "void").unwrap();
	/// assert_eq!(desc.write(), "(Ljava/lang/String;I)V");
	/// ```
	pub fn from_verbose(arguments: &str, return_type: &str) -> Result<MethodDescriptor> {
		let inner = arguments.strip_prefix('(')
			.and_then(|arguments| arguments.strip_suffix(')'))
			.with_context(|| anyhow!("parameter list {arguments:?} isn't enclosed in parentheses"))?;

		let parameter_descriptors = inner.split(',')
			.filter(|parameter| !parameter.is_empty())
			.map(read_verbose_type)
			.collect::<Result<Vec<_>>>()
			.with_context(|| anyhow!("failed to read parameters {arguments:?}"))?;

		let return_descriptor = if return_type == "void" {
			None
		} else {
			let descriptor = read_verbose_type(return_type)
				.with_context(|| anyhow!("failed to read return type {return_type:?}"))?;
			Some(descriptor)
		};

		Ok(MethodDescriptor { parameter_descriptors, return_descriptor })
	}

	/// Parses a method descriptor in the verbose form, given in one piece like `(java.lang.String,int)void`.
	///
	/// The inverse of this function is [`MethodDescriptor::write_verbose`].
	pub fn parse_verbose(desc: &str) -> Result<MethodDescriptor> {
		let close = desc.find(')')
			.with_context(|| anyhow!("verbose descriptor {desc:?} has no `)`"))?;
		let (arguments, return_type) = desc.split_at(close + 1);

		MethodDescriptor::from_verbose(arguments, return_type)
			.with_context(|| anyhow!("failed to read verbose descriptor {desc:?}"))
	}

	/// Writes the method descriptor in the verbose form, in one piece.
	pub fn write_verbose(&self) -> String {
		let mut s = String::new();
		s.push('(');
		for (index, parameter_descriptor) in self.parameter_descriptors.iter().enumerate() {
			if index != 0 {
				s.push(',');
			}
			parameter_descriptor.write_verbose(&mut s);
		}
		s.push(')');
		match &self.return_descriptor {
			Some(return_descriptor) => return_descriptor.write_verbose(&mut s),
			None => s.push_str("void"),
		}
		s
	}

	/// Replaces every class name in the descriptor by the result of the given function.
	pub fn map_classes(&mut self, mut f: impl FnMut(&str) -> String) {
		for descriptor in self.parameter_descriptors.iter_mut().chain(self.return_descriptor.as_mut()) {
			if let ElementType::Object(class) = &mut descriptor.element {
				*class = f(class);
			}
		}
	}
}

/// Converts a verbose method descriptor into the bytecode form, remapping class names on the way.
///
/// Each class name is first resolved by the `bridge` (deobfuscated to obfuscated names), and the result of that by
/// `classes` (obfuscated to public names). A class name that doesn't resolve in the second step is kept as it
/// was given.
///
/// ```
/// # use pretty_assertions::assert_eq;
/// use spigot_mapper::class_table::{ClassBridgeTable, ClassTable, Direction};
/// use spigot_mapper::descriptor::encode;
///
/// let bridge = ClassBridgeTable::load(["net.minecraft.world.entity.Entity -> a:"]).unwrap();
/// let classes = ClassTable::load(["a net/minecraft/server/Entity"]);
///
/// let desc = encode(
///     "(net.minecraft.world.entity.Entity,java.lang.String[])",
///     "boolean",
///     &bridge,
///     &classes.resolver(Direction::ObfuscatedToPublic),
/// ).unwrap();
/// assert_eq!(desc, "(Lnet/minecraft/server/Entity;[Ljava/lang/String;)Z");
/// ```
pub fn encode(
	arguments: &str,
	return_type: &str,
	bridge: &(impl ClassResolver + ?Sized),
	classes: &(impl ClassResolver + ?Sized),
) -> Result<String> {
	let mut descriptor = MethodDescriptor::from_verbose(arguments, return_type)?;

	descriptor.map_classes(|class| {
		let obfuscated = bridge.resolve_class(class);
		classes.resolve_class(obfuscated.as_deref().unwrap_or(class))
			.unwrap_or_else(|| class.to_owned())
	});

	Ok(descriptor.write())
}

/// Converts a method descriptor in the bytecode form into the verbose form, in one piece.
///
/// ```
/// # use pretty_assertions::assert_eq;
/// assert_eq!(
///     spigot_mapper::descriptor::decode("([JLjava/lang/Object;)Z").unwrap(),
///     "(long[],java.lang.Object)boolean"
/// );
/// ```
pub fn decode(desc: &str) -> Result<String> {
	MethodDescriptor::parse(desc)
		.map(|descriptor| descriptor.write_verbose())
}

/// Remaps all class names of a method descriptor in the bytecode form.
///
/// Class names the `resolver` doesn't know are kept as they are.
pub fn remap(desc: &str, resolver: &(impl ClassResolver + ?Sized)) -> Result<String> {
	let mut descriptor = MethodDescriptor::parse(desc)?;

	descriptor.map_classes(|class| resolver.map_class(class));

	Ok(descriptor.write())
}

#[cfg(test)]
mod testing {
	use anyhow::Result;
	use pretty_assertions::assert_eq;
	use crate::class_table::{ClassBridgeTable, ClassTable, Direction};
	use crate::descriptor::{decode, encode, remap, ElementType, MethodDescriptor, Primitive, Type};

	const VALID: [&str; 7] = [
		"()V",
		"(I)V",
		"(BCDFIJSZ)V",
		"()[[[D",
		"([[JLjava/lang/String;Z)[Ljava/lang/Object;",
		"(Lnet/minecraft/server/Entity$Removal;)I",
		"(Ljava/util/List;Ljava/util/Map;)Ljava/util/Set;",
	];

	#[test]
	fn parse_and_write() -> Result<()> {
		for desc in VALID {
			assert_eq!(MethodDescriptor::parse(desc)?.write(), desc);
		}
		Ok(())
	}

	#[test]
	fn parse_tokens() -> Result<()> {
		let desc = MethodDescriptor::parse("([[JLjava/lang/String;Z)[Ljava/lang/Object;")?;

		assert_eq!(desc, MethodDescriptor {
			parameter_descriptors: vec![
				Type::array(2, ElementType::Primitive(Primitive::Long)),
				Type::object("java/lang/String"),
				Type::primitive(Primitive::Boolean),
			],
			return_descriptor: Some(Type::array(1, ElementType::Object("java/lang/Object".to_owned()))),
		});
		Ok(())
	}

	#[test]
	fn parse_invalid() {
		let invalid = [
			"",
			"V",
			"(",
			"()",
			"I)V",
			"(V)V",
			"(X)V",
			"([)V",
			"(L;)V",
			"(Ljava/lang/String)V",
			"()VV",
			"()V;",
		];

		for desc in invalid {
			assert!(MethodDescriptor::parse(desc).is_err(), "{desc:?} is an invalid method descriptor");
		}
	}

	#[test]
	fn verbose() -> Result<()> {
		let desc = MethodDescriptor::from_verbose("(java.lang.String,int)", "void")?;
		assert_eq!(desc.write(), "(Ljava/lang/String;I)V");

		let desc = MethodDescriptor::from_verbose("()", "net.minecraft.world.entity.Entity$RemovalReason[][]")?;
		assert_eq!(desc.write(), "()[[Lnet/minecraft/world/entity/Entity$RemovalReason;");

		let desc = MethodDescriptor::from_verbose("(byte,char,double,float,int,long,short,boolean)", "void")?;
		assert_eq!(desc.write(), "(BCDFIJSZ)V");

		assert!(MethodDescriptor::from_verbose("java.lang.String", "void").is_err());
		assert!(MethodDescriptor::from_verbose("(void)", "void").is_err());
		assert!(MethodDescriptor::from_verbose("(int[])", "").is_err());
		assert!(MethodDescriptor::from_verbose("([])", "void").is_err());
		Ok(())
	}

	#[test]
	fn verbose_skips_empty_parameters() -> Result<()> {
		let desc = MethodDescriptor::from_verbose("(int,,long,)", "void")?;
		assert_eq!(desc.write(), "(IJ)V");
		Ok(())
	}

	#[test]
	fn decode_writes_verbose() -> Result<()> {
		assert_eq!(decode("()V")?, "()void");
		assert_eq!(decode("([[JLjava/lang/String;Z)[Ljava/lang/Object;")?, "(long[][],java.lang.String,boolean)java.lang.Object[]");
		Ok(())
	}

	#[test]
	fn encode_decode_round_trip() -> Result<()> {
		let bridge = ClassBridgeTable::new();
		let classes = ClassTable::new();
		let classes = classes.resolver(Direction::ObfuscatedToPublic);

		for desc in VALID {
			let verbose = decode(desc)?;
			let close = verbose.find(')').map_or(0, |close| close + 1);
			let (arguments, return_type) = verbose.split_at(close);

			assert_eq!(encode(arguments, return_type, &bridge, &classes)?, desc);
			assert_eq!(MethodDescriptor::parse_verbose(&verbose)?.write(), desc);
		}
		Ok(())
	}

	#[test]
	fn encode_remaps_through_both_tables() -> Result<()> {
		let bridge = ClassBridgeTable::load([
			"net.minecraft.world.entity.Entity -> a:",
			"net.minecraft.world.entity.Entity$RemovalReason -> a$b:",
			"com.mojang.math.Vector3f -> x:",
		])?;
		let classes = ClassTable::load(["a net/minecraft/server/Entity"]);
		let classes = classes.resolver(Direction::ObfuscatedToPublic);

		assert_eq!(
			encode("(net.minecraft.world.entity.Entity$RemovalReason,java.lang.String[])", "net.minecraft.world.entity.Entity", &bridge, &classes)?,
			"(Lnet/minecraft/server/Entity$b;[Ljava/lang/String;)Lnet/minecraft/server/Entity;"
		);
		// known to the bridge, but without a public name: keeps the deobfuscated name
		assert_eq!(
			encode("(com.mojang.math.Vector3f)", "void", &bridge, &classes)?,
			"(Lcom/mojang/math/Vector3f;)V"
		);
		Ok(())
	}

	#[test]
	fn remap_bytecode() -> Result<()> {
		let classes = ClassTable::load([
			"a net/minecraft/server/Entity",
			"b net/minecraft/server/World",
		]);
		let to_obfuscated = classes.resolver(Direction::PublicToObfuscated);

		assert_eq!(
			remap("(Lnet/minecraft/server/Entity;I[[Lnet/minecraft/server/World$1;Ljava/lang/String;)Lnet/minecraft/server/World;", &to_obfuscated)?,
			"(La;I[[Lb$1;Ljava/lang/String;)Lb;"
		);
		assert_eq!(remap("([IJ)[Z", &to_obfuscated)?, "([IJ)[Z");
		assert!(remap("(Lnet/minecraft/server/Entity)V", &to_obfuscated).is_err());
		Ok(())
	}
}
