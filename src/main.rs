use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use log::{debug, info, LevelFilter};
use spigot_mapper::class_table::ClassTable;
use spigot_mapper::combine::combine;
use spigot_mapper::members::remap_members;
use spigot_mapper::strip_broken_lines;

#[derive(Debug, Parser)]
#[command(version, about = "Generates Spigot member mappings from the Mojang mappings")]
struct Cli {
	/// Be verbose. Give twice for even more output.
	#[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
	verbose: u8,

	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Remaps the members of a Mojang mapping file, giving them public class names
	Members {
		/// The class table, a `.csrg` file with two columns
		#[arg(long = "classes")]
		classes: PathBuf,
		/// The Mojang mapping file, in the ProGuard format
		#[arg(long = "mappings")]
		mappings: PathBuf,
		#[arg(short = 'o', long = "output")]
		output: PathBuf,
		/// Only remap fields, appending `_` to fields named `if` or `do`
		#[arg(long = "fields-only")]
		fields_only: bool,
	},
	/// Combines the class table and member files into one file with obfuscated class names
	Combine {
		/// The class table, a `.csrg` file with two columns
		#[arg(long = "classes")]
		classes: PathBuf,
		#[arg(short = 'o', long = "output")]
		output: PathBuf,
		/// Remove lines with known syntax errors and lines with constructors from all inputs
		#[arg(long = "strip-broken-lines")]
		strip_broken_lines: bool,
		/// The member files, as written by the `members` command
		#[arg(required = true)]
		members: Vec<PathBuf>,
	},
}

fn setup_logger(verbose: u8) -> Result<()> {
	let level = match verbose {
		0 => LevelFilter::Info,
		1 => LevelFilter::Debug,
		_ => LevelFilter::Trace,
	};

	fern::Dispatch::new()
		.format(|out, message, record| {
			out.finish(format_args!("[{} {}] {}", record.level(), record.target(), message))
		})
		.level(level)
		.chain(std::io::stderr())
		.apply()
		.context("failed to set up the logger")
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
	let string = std::fs::read_to_string(path)
		.with_context(|| anyhow!("failed to read {path:?}"))?;

	let lines: Vec<String> = string.lines()
		.map(str::to_owned)
		.collect();

	debug!("read {} lines from {path:?}", lines.len());

	Ok(lines)
}

fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
	let file = File::create(path)
		.with_context(|| anyhow!("failed to create {path:?}"))?;
	let mut writer = BufWriter::new(file);

	for line in lines {
		writeln!(writer, "{line}")
			.with_context(|| anyhow!("failed to write to {path:?}"))?;
	}
	writer.flush()
		.with_context(|| anyhow!("failed to write to {path:?}"))?;

	info!("wrote {} lines to {path:?}", lines.len());

	Ok(())
}

fn run(command: Command) -> Result<()> {
	match command {
		Command::Members { classes, mappings, output, fields_only } => {
			let class_table = ClassTable::load(read_lines(&classes)?);
			let mapping_lines = read_lines(&mappings)?;

			let lines = remap_members(&class_table, &mapping_lines, !fields_only)
				.with_context(|| anyhow!("failed to remap the members of {mappings:?}"))?;

			write_lines(&output, &lines)
		},
		Command::Combine { classes, output, strip_broken_lines: strip, members } => {
			let read = |path: &Path| -> Result<Vec<String>> {
				let lines = read_lines(path)?;
				Ok(if strip { strip_broken_lines(lines) } else { lines })
			};

			let class_table = ClassTable::load(read(classes.as_path())?);
			let member_files = members.iter()
				.map(|path| read(path.as_path()))
				.collect::<Result<Vec<_>>>()?;

			let lines = combine(&class_table, &member_files)
				.with_context(|| anyhow!("failed to combine the member files {members:?}"))?;

			write_lines(&output, &lines)
		},
	}
}

fn main() -> Result<()> {
	let Cli { verbose, command } = Cli::parse();

	setup_logger(verbose)?;

	let start = Instant::now();
	run(command)?;
	info!("done, took {:.3}s", start.elapsed().as_secs_f64());

	Ok(())
}
