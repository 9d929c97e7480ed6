use anyhow::Result;
use pretty_assertions::assert_eq;
use spigot_mapper::class_table::ClassTable;
use spigot_mapper::members::remap_members;

fn read_classes() -> ClassTable {
	ClassTable::load(include_str!("bukkit-cl.csrg").lines())
}

fn read_mappings() -> Vec<&'static str> {
	include_str!("server.txt").lines().collect()
}

#[test]
fn fields_and_methods() -> Result<()> {
	let classes = read_classes();
	let mappings = read_mappings();

	let output = remap_members(&classes, &mappings, true)?;

	let expected: Vec<_> = include_str!("members.csrg").lines().collect();
	assert_eq!(output, expected);
	Ok(())
}

#[test]
fn fields_only() -> Result<()> {
	let classes = read_classes();
	let mappings = read_mappings();

	let output = remap_members(&classes, &mappings, false)?;

	let expected: Vec<_> = include_str!("fields.csrg").lines().collect();
	assert_eq!(output, expected);
	Ok(())
}

#[test]
fn deterministic() -> Result<()> {
	let classes = read_classes();
	let mut mappings = read_mappings();

	let first = remap_members(&classes, &mappings, true)?;
	assert_eq!(remap_members(&classes, &mappings, true)?, first);

	// moving a whole class block around doesn't change the output
	let item_stack = mappings.iter().position(|line| line.starts_with("net.minecraft.world.item.ItemStack"))
		.ok_or_else(|| anyhow::anyhow!("fixture has no ItemStack class"))?;
	let mut moved = mappings.split_off(item_stack);
	moved.append(&mut mappings);

	assert_eq!(remap_members(&classes, &moved, true)?, first);
	Ok(())
}
