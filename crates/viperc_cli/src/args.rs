//! the args for running viperc

use crate::logging::LoggingArgs;
use std::path::{Path, PathBuf};
use viperc::os::PATH_DELIMITER;

/// The args struct
#[derive(Debug, clap::Parser)]
#[clap(author, version, about = "Preprocesses and parses viper source files")]
pub struct Args {
    #[command(flatten)]
    logging: LoggingArgs,

    /// Specify which source files to compile. Directories are searched for source files.
    #[clap(required = true, value_name = "source file", value_hint = clap::ValueHint::AnyPath)]
    pub files: Vec<PathBuf>,
    /// Specify directories to search for included modules.
    ///
    /// Can use multiple includes for many directories, a native PATH-like string, or both.
    #[clap(short = 'i', long = "include", env = "VIPER_PATH")]
    include: Vec<String>,
    /// Maximum number of files compiled at once, defaults to the number of cpus
    #[clap(short = 'j', long)]
    pub jobs: Option<usize>,
    /// Treat every warning as fatal
    #[clap(short = 'W', long)]
    pub warnings_as_errors: bool,
    /// Print the preprocessed tokens of each file
    #[clap(long)]
    pub print_tokens: bool,
    /// Print the syntax tree of each file
    #[clap(long)]
    pub print_ast: bool,
}

impl Args {
    /// Gets the directories searched for includes
    pub fn included(&self) -> Vec<&Path> {
        self.include
            .iter()
            .flat_map(|s| s.split(PATH_DELIMITER))
            .filter(|s| !s.is_empty())
            .map(Path::new)
            .collect()
    }

    pub fn logging(&self) -> &LoggingArgs {
        &self.logging
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_args_parsing() {
        let test = "viperc file.vp --print-ast -j 4";
        let args = Args::try_parse_from(test.split(" ")).expect("could not parse test string");
        assert_eq!(args.files[0], Path::new("file.vp"));
        assert!(args.print_ast);
        assert!(!args.print_tokens);
        assert_eq!(args.jobs, Some(4));
    }

    #[test]
    fn test_files_required() {
        assert!(Args::try_parse_from(["viperc"]).is_err());
    }

    #[test]
    #[cfg(unix)]
    fn test_include_parsing_colon() {
        let test = "viperc file.vp -i lib:vendor/std -i more";
        let args = Args::try_parse_from(test.split(" ")).expect("could not parse test string");
        let included = args.included();
        assert_eq!(included, [Path::new("lib"), Path::new("vendor/std"), Path::new("more")]);
    }

    #[test]
    #[cfg(windows)]
    fn test_include_parsing_semi_colon() {
        let test = "viperc file.vp -i lib;vendor";
        let args = Args::try_parse_from(test.split(" ")).expect("could not parse test string");
        let included = args.included();
        assert_eq!(included, [Path::new("lib"), Path::new("vendor")]);
    }
}
