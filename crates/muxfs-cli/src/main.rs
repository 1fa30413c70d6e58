//! muxfs command-line browser.
//!
//! Mounts host directories under identifiers and browses them through one
//! read-only namespace.
//!
//! Usage:
//!   muxfs --mount photos=/srv/photos --mount docs=~/docs ls
//!   muxfs --config muxfs.toml ls -l photos/2024
//!   muxfs --config muxfs.toml cat docs/notes.txt
//!   muxfs --config muxfs.toml stat photos

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use muxfs::{DirEntry, File, FileAttr, FileSystem, LocalFs, MultiFs, MuxConfig, expand_home};

/// Browse many directories as one read-only tree.
#[derive(Parser, Debug)]
#[command(name = "muxfs")]
#[command(about = "Browse many directories as one read-only tree")]
struct Args {
    /// TOML file with [[mount]] tables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Mount a host directory: ID=PATH (repeatable, applied after --config)
    #[arg(short, long = "mount", value_name = "ID=PATH")]
    mounts: Vec<String>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List mount identifiers
    Mounts,
    /// List a directory
    Ls {
        /// Path inside the namespace
        #[arg(default_value = ".")]
        path: String,
        /// Show type, mode and size
        #[arg(short, long)]
        long: bool,
    },
    /// Write a file to stdout
    Cat {
        /// Path inside the namespace
        path: String,
    },
    /// Show file metadata
    Stat {
        /// Path inside the namespace
        path: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mux = build(&args)?;
    tracing::debug!(mounts = mux.len(), "namespace ready");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match &args.command {
        Command::Mounts => {
            for mount in mux.list_mounts() {
                writeln!(out, "{}", mount.id)?;
            }
        }
        Command::Ls { path, long } => {
            let entries = mux
                .read_dir(path)
                .with_context(|| format!("cannot list {path}"))?;
            for entry in entries {
                if *long {
                    writeln!(out, "{}", long_line(&entry))?;
                } else {
                    writeln!(out, "{}", entry.name)?;
                }
            }
        }
        Command::Cat { path } => cat(&mux, path, &mut out)?,
        Command::Stat { path } => {
            let attr = mux
                .stat(path)
                .with_context(|| format!("cannot stat {path}"))?;
            write_stat(&mut out, &attr)?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Assemble the namespace from the config file, then `--mount` flags.
fn build(args: &Args) -> Result<MultiFs> {
    let mux = MultiFs::new();

    if let Some(path) = &args.config {
        let config = MuxConfig::load(path)?;
        config.apply(&mux)?;
    }

    for spec in &args.mounts {
        let Some((id, dir)) = spec.split_once('=') else {
            bail!("--mount expects ID=PATH, got {spec:?}");
        };
        let dir = expand_home(Path::new(dir));
        mux.mount(id, LocalFs::new(&dir))
            .with_context(|| format!("cannot mount {} as {id:?}", dir.display()))?;
    }

    Ok(mux)
}

/// Stream a file in chunks.
fn cat(mux: &MultiFs, path: &str, out: &mut impl Write) -> Result<()> {
    let mut file = mux.open(path).with_context(|| format!("cannot open {path}"))?;
    if file.stat()?.is_dir() {
        bail!("{path} is a directory");
    }

    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n])?;
    }
    file.close()?;
    Ok(())
}

fn long_line(entry: &DirEntry) -> String {
    let attr = entry.info();
    format!(
        "{} {:>10} {}{}",
        mode_string(&attr),
        attr.size,
        entry.name,
        if entry.is_dir() { "/" } else { "" }
    )
}

fn write_stat(out: &mut impl Write, attr: &FileAttr) -> Result<()> {
    let mtime = attr
        .mtime
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    writeln!(out, "name:  {}", attr.name)?;
    writeln!(out, "type:  {:?}", attr.kind)?;
    writeln!(out, "size:  {}", attr.size)?;
    writeln!(out, "mode:  {} ({:o})", mode_string(attr), attr.mode())?;
    writeln!(out, "mtime: {mtime}")?;
    Ok(())
}

/// `ls -l` style mode column, e.g. `dr-xr-xr-x`.
fn mode_string(attr: &FileAttr) -> String {
    let kind = if attr.is_dir() {
        'd'
    } else if attr.is_symlink() {
        'l'
    } else {
        '-'
    };

    let mut s = String::with_capacity(10);
    s.push(kind);
    for shift in [6, 3, 0] {
        let bits = (attr.perm >> shift) & 0o7;
        s.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        s.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        s.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use muxfs::MemoryFs;

    #[test]
    fn test_mode_string() {
        assert_eq!(mode_string(&FileAttr::synthetic_dir("x")), "dr-xr-xr-x");
        let file = FileAttr::file("f", 1, 0o640, UNIX_EPOCH);
        assert_eq!(mode_string(&file), "-rw-r-----");
    }

    #[test]
    fn test_cat() {
        let mux = MultiFs::new();
        mux.mount("one", MemoryFs::new().with_file("a.txt", b"alpha"))
            .unwrap();

        let mut out = Vec::new();
        cat(&mux, "one/a.txt", &mut out).unwrap();
        assert_eq!(out, b"alpha");

        assert!(cat(&mux, "one", &mut Vec::new()).is_err());
    }

    #[test]
    fn test_build_rejects_bad_mount_flag() {
        let args = Args::parse_from(["muxfs", "--mount", "no-equals-sign", "mounts"]);
        assert!(build(&args).is_err());
    }

    #[test]
    fn test_build_expands_home_in_mount_flag() {
        let home = tempfile::TempDir::new().unwrap();
        std::fs::write(home.path().join("a.txt"), b"alpha").unwrap();
        // SAFETY: no other test in this binary reads HOME.
        unsafe { std::env::set_var("HOME", home.path()) };

        let args = Args::parse_from(["muxfs", "--mount", "h=~", "mounts"]);
        let mux = build(&args).unwrap();
        assert_eq!(muxfs::read_file(&mux, "h/a.txt").unwrap(), b"alpha");
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["muxfs", "-m", "a=/x", "-m", "b=/y", "ls", "-l", "a"]);
        assert_eq!(args.mounts, ["a=/x", "b=/y"]);
        assert!(matches!(args.command, Command::Ls { ref path, long: true } if path == "a"));
    }
}
