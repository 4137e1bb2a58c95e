// Default settings shared by the core and the drivers

/// Character used for freshly grown tape cells
pub const DEFAULT_FILL: char = '_';

/// Number of bytes pulled from a file-backed source per refill
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// A file-backed buffer refills once fewer than this many characters remain buffered
pub const DEFAULT_REFILL_THRESHOLD: usize = 10;

/// Delay between automatic steps in the TUI and the `--delay-ms` default
pub const DEFAULT_PLAY_DELAY_MS: u64 = 100;

/// Step cap for headless runs, guards against non-terminating programs
pub const DEFAULT_MAX_STEPS: usize = 1_000_000;

/// Memory budget for the TUI snapshot history (256 MB)
pub const SNAPSHOT_MEMORY_LIMIT: usize = 256 * 1024 * 1024;

/// Program used when no source file is given on the command line
pub const DEMO_PROGRAM: &str = r#"# Writes a name, then turns every leading '0' into '1'.
print_name:
{
    write 'A';
    right 1; write 'a';
    right 1; write 'r';
    right 1; write 'o';
    right 1; write 'n';
    right 1;
    while(= read '0') { write '1'; right 1; }
    halt;
}
left 3;
goto print_name;
"#;
