//! Crate for translating the member mappings of a Minecraft server between the obfuscated, the public (Spigot) and
//! the deobfuscated (Mojang) names.
//!
//! The [`class_table`] holds the class names everything else is resolved against, read from a `.csrg` file. With
//! it, [`members::remap_members`] turns a mapping file in the ProGuard format into a member file with public class
//! names, and [`combine::combine`] merges member files back into one file with obfuscated class names.
//!
//! Inner classes not listed in the class table are resolved with the help of their enclosing classes, see the
//! [`resolver`] module. Method descriptors are handled by the [`descriptor`] module.

mod lines;

pub mod class_table;
pub mod resolver;
pub mod descriptor;

pub mod members;
pub mod combine;

pub use lines::{is_broken_line, strip_broken_lines};
