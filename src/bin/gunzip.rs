use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{value_parser, Arg, ArgAction, Command};
use log::{error, info, Level};

fn create_cmd_args() -> Command
{
    Command::new("gunzip")
        .about("Decompress one or more gzip files")
        .arg(
            Arg::new("paths")
                .help("Gzip files to decompress")
                .action(ArgAction::Append)
                .value_parser(value_parser!(PathBuf))
                .required(true)
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Directory to write decompressed files into (default: alongside the input, with .gz stripped)")
                .value_parser(value_parser!(PathBuf))
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .help_heading("LOGGING")
                .help("Only report errors")
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help_heading("LOGGING")
                .help("Display debug information")
        )
}

fn setup_logger(quiet: bool, verbose: bool)
{
    let log_level = if quiet
    {
        Level::Error
    }
    else if verbose
    {
        Level::Debug
    }
    else
    {
        Level::Info
    };

    simple_logger::init_with_level(log_level).unwrap();
}

fn output_path_for(input: &Path, output_dir: Option<&PathBuf>) -> PathBuf
{
    let stem = input.file_stem().unwrap_or(input.as_os_str());

    match output_dir
    {
        Some(dir) => dir.join(stem),
        None => input.with_file_name(stem)
    }
}

fn decompress_one(input: &Path, output_dir: Option<&PathBuf>) -> Result<(), ()>
{
    let compressed = std::fs::read(input).map_err(|e| {
        error!("{}: could not read input: {e}", input.display());
    })?;

    let out_path = output_path_for(input, output_dir);
    let out_file = File::create(&out_path).map_err(|e| {
        error!("{}: could not create output file: {e}", out_path.display());
    })?;
    let mut writer = BufWriter::new(out_file);

    match zune_gzip::gunzip(&compressed, &mut writer)
    {
        Ok(()) =>
        {
            info!("{} -> {}", input.display(), out_path.display());
            Ok(())
        }
        Err(err) =>
        {
            error!("{}: {err:?}", input.display());
            Err(())
        }
    }
}

fn main() -> ExitCode
{
    let matches = create_cmd_args().get_matches();

    setup_logger(matches.get_flag("quiet"), matches.get_flag("verbose"));

    let paths = matches
        .get_many::<PathBuf>("paths")
        .expect("paths is required");
    let output_dir = matches.get_one::<PathBuf>("output");

    let mut had_error = false;

    for path in paths
    {
        if decompress_one(path, output_dir).is_err()
        {
            had_error = true;
        }
    }

    if had_error
    {
        ExitCode::FAILURE
    }
    else
    {
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn verify_cli()
    {
        create_cmd_args().debug_assert();
    }

    #[test]
    fn output_path_strips_gz_extension_when_no_output_dir_given()
    {
        let input = Path::new("/tmp/archive.gz");
        assert_eq!(output_path_for(input, None), Path::new("/tmp/archive"));
    }

    #[test]
    fn output_path_honors_output_dir()
    {
        let input = Path::new("/tmp/archive.gz");
        let dir = PathBuf::from("/out");
        assert_eq!(output_path_for(input, Some(&dir)), Path::new("/out/archive"));
    }
}
