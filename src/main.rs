use clap::{ArgAction, Parser, Subcommand};
use env_logger::Builder;
use ferric_sftp_attrs::sftp::{
    AccessModificationTime, FileAttributes, OpenFlags, Permissions, TimePolicy,
};
use log::{info, warn, LevelFilter};

/// Inspect and build SFTP v3 attribute blocks and open flags.
#[derive(Debug, Parser)]
#[command(name = "sftp-attrs", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decode a hex attribute block
    Decode { block: String },
    /// Build an attribute block and print it as hex
    Encode {
        #[arg(long)]
        size: Option<u64>,
        #[arg(long, requires = "gid")]
        uid: Option<u32>,
        #[arg(long, requires = "uid")]
        gid: Option<u32>,
        /// Mode in octal, e.g. 100644
        #[arg(long, value_parser = parse_octal)]
        permissions: Option<u32>,
        /// Access time in seconds since the epoch
        #[arg(long, requires = "mtime", allow_hyphen_values = true)]
        atime: Option<i64>,
        /// Modification time in seconds since the epoch
        #[arg(long, requires = "atime", allow_hyphen_values = true)]
        mtime: Option<i64>,
        /// Extended attribute as NAME=VALUE, repeatable
        #[arg(long = "ext", value_parser = parse_pair)]
        extended: Vec<(String, String)>,
        /// Fail on timestamps that do not fit 32 bits instead of wrapping
        #[arg(long)]
        strict: bool,
    },
    /// Compute a pflags word
    Pflags {
        #[arg(long)]
        read: bool,
        #[arg(long)]
        write: bool,
        #[arg(long)]
        append: bool,
        #[arg(long)]
        create: bool,
        #[arg(long)]
        truncate: bool,
        #[arg(long)]
        exclusive: bool,
        /// fopen(3) style mode such as "w+" instead of individual flags
        #[arg(long, conflicts_with_all = ["read", "write", "append", "create", "truncate", "exclusive"])]
        mode: Option<String>,
    },
    /// Classify a mode value
    Mode {
        #[arg(value_parser = parse_octal)]
        mode: u32,
    },
}

fn parse_octal(s: &str) -> Result<u32, String> {
    let digits = s.trim_start_matches("0o");
    u32::from_str_radix(digits, 8).map_err(|e| format!("invalid octal mode {}: {}", s, e))
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got {}", s))
}

fn timestamp(secs: i64) -> Result<chrono::DateTime<chrono::Utc>, String> {
    chrono::DateTime::from_timestamp(secs, 0).ok_or_else(|| format!("timestamp {} out of range", secs))
}

fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Decode { block } => {
            let bytes = hex::decode(block.trim())?;
            let (attrs, consumed) = FileAttributes::decode_prefix(&bytes)?;
            if consumed < bytes.len() {
                warn!("{} trailing bytes after attribute block", bytes.len() - consumed);
            }

            println!("flags:       0x{:08x}", attrs.flags().bits());
            if let Some(size) = attrs.size {
                println!("size:        {}", size);
            }
            if let Some(ids) = attrs.uidgid {
                println!("uid/gid:     {}/{}", ids.user_id, ids.group_id);
            }
            if let Some(perms) = attrs.permissions {
                println!(
                    "permissions: 0o{:o} {} ({:?})",
                    perms.mode(),
                    perms,
                    perms.file_type()
                );
            }
            if let Some(times) = attrs.times {
                println!("atime:       {}", times.access_time().to_rfc3339());
                println!("mtime:       {}", times.modification_time().to_rfc3339());
            }
            for (name, value) in &attrs.extended {
                println!("extended:    {} = {}", name, value);
            }
        }
        Command::Encode {
            size,
            uid,
            gid,
            permissions,
            atime,
            mtime,
            extended,
            strict,
        } => {
            let mut attrs = FileAttributes::new();
            attrs.size = size;
            if let (Some(uid), Some(gid)) = (uid, gid) {
                attrs = attrs.with_uidgid(uid, gid);
            }
            attrs.permissions = permissions.map(Permissions::from_mode);
            if let (Some(atime), Some(mtime)) = (atime, mtime) {
                attrs = attrs.with_times(AccessModificationTime::new(
                    timestamp(atime)?,
                    timestamp(mtime)?,
                ));
            }
            attrs.extended = extended;

            let policy = if strict {
                TimePolicy::Strict
            } else {
                TimePolicy::Wrap
            };
            info!("Encoding {}", attrs);
            println!("{}", hex::encode(attrs.encode_with(policy)?));
        }
        Command::Pflags {
            read,
            write,
            append,
            create,
            truncate,
            exclusive,
            mode,
        } => {
            let flags = match mode {
                Some(mode) => OpenFlags::from_fopen_mode(&mode)
                    .ok_or_else(|| format!("unknown open mode {:?}", mode))?,
                None => {
                    let mut flags = OpenFlags::empty();
                    flags.set(OpenFlags::READ, read);
                    flags.set(OpenFlags::WRITE, write);
                    flags.set(OpenFlags::APPEND, append);
                    flags.set(OpenFlags::CREATE, create);
                    flags.set(OpenFlags::TRUNCATE, truncate);
                    flags.set(OpenFlags::EXCLUSIVE, exclusive);
                    flags
                }
            };
            if flags.missing_create() {
                warn!("{:?}: truncate/exclusive require create", flags);
            }
            println!("{:?}", flags);
        }
        Command::Mode { mode } => {
            let perms = Permissions::from_mode(mode);
            println!("{} {:?}", perms, perms.file_type());
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    // RUST_LOG, when set, overrides -v.
    Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();

    if let Err(e) = run(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
