//! Parallel classification of many files.
//!
//! Bottle maintenance walks directories full of executables and shortcuts. Each file is decoded
//! independently, so [`scan_paths`] hands the work to rayon's global pool and returns one
//! [`ScanReport`] per path, in input order. Walking the directory tree, and deciding when to stop,
//! is left to the caller.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bottlescope::{scan::{scan_paths, ScanOutcome}, DecoderConfig};
//! use std::path::PathBuf;
//!
//! let paths = vec![
//!     PathBuf::from("drive_c/Program Files/Game/game.exe"),
//!     PathBuf::from("drive_c/users/Public/Desktop/Game.lnk"),
//! ];
//!
//! for report in scan_paths(&paths, DecoderConfig::minimal()) {
//!     match report.outcome {
//!         ScanOutcome::Executable(arch) => println!("{}: {arch:?}", report.path.display()),
//!         ScanOutcome::Shortcut(Some(target)) => println!("{} -> {target}", report.path.display()),
//!         other => println!("{}: {other:?}", report.path.display()),
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::{
    config::DecoderConfig,
    file::{io::read_le, Input},
    pe::{Architecture, DOS_SIGNATURE},
    shelllink::{ShellLinkDecoder, SHELL_LINK_HEADER_SIZE},
    DecodeFailure,
};

/// What a scanned file turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// A well-formed PE image
    Executable(Architecture),
    /// A Shell Link, with its target if it could be resolved
    Shortcut(Option<String>),
    /// Starts like a PE image or a Shell Link but could not be decoded, or could not be read
    Failed(DecodeFailure),
    /// Neither a PE image nor a Shell Link
    Unrecognized,
}

/// The outcome for a single path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    /// The scanned path
    pub path: PathBuf,
    /// What was found there
    pub outcome: ScanOutcome,
}

/// Classify every path in parallel.
///
/// Files starting with `"MZ"` are decoded as PE images and files starting with a Shell Link
/// header size as shortcuts. Failures are reported per file and never abort the scan.
#[must_use]
pub fn scan_paths(paths: &[PathBuf], config: DecoderConfig) -> Vec<ScanReport> {
    let decoder = ShellLinkDecoder::new(config);

    paths
        .par_iter()
        .map(|path| ScanReport {
            path: path.clone(),
            outcome: scan_path(path, &decoder),
        })
        .collect()
}

/// Classify a single path.
#[must_use]
pub fn scan_path(path: &Path, decoder: &ShellLinkDecoder) -> ScanOutcome {
    let input = match Input::from_file(path) {
        Ok(input) => input,
        Err(error) => {
            log::warn!("cannot read {}: {error}", path.display());
            return ScanOutcome::Failed(DecodeFailure::from(error));
        }
    };

    let outcome = classify_bytes(input.data(), decoder);
    if let ScanOutcome::Failed(failure) = &outcome {
        log::warn!("{}: {failure}", path.display());
    }
    outcome
}

fn classify_bytes(data: &[u8], decoder: &ShellLinkDecoder) -> ScanOutcome {
    if read_le::<u16>(data).is_ok_and(|signature| signature == DOS_SIGNATURE) {
        return match crate::classify_executable(data) {
            Ok(architecture) => ScanOutcome::Executable(architecture),
            Err(failure) => ScanOutcome::Failed(failure),
        };
    }

    if read_le::<u32>(data).is_ok_and(|size| size as usize == SHELL_LINK_HEADER_SIZE) {
        return match decoder.decode(data) {
            Ok(link) => ScanOutcome::Shortcut(link.target()),
            Err(error) => ScanOutcome::Failed(DecodeFailure::from(error)),
        };
    }

    ScanOutcome::Unrecognized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test::{LinkBuilder, PeBuilder},
        LinkFlags,
    };

    #[test]
    fn classify_in_memory() {
        let decoder = ShellLinkDecoder::default();

        let exe = PeBuilder::new().magic(0x020B).build();
        assert_eq!(
            classify_bytes(&exe, &decoder),
            ScanOutcome::Executable(Architecture::X64)
        );

        let broken = PeBuilder::new().magic(0x0107).build();
        assert_eq!(
            classify_bytes(&broken, &decoder),
            ScanOutcome::Failed(DecodeFailure::INVALID_PE_FILE)
        );

        let link = LinkBuilder::new()
            .flags(LinkFlags::HAS_LINK_INFO)
            .local_link_info("C:\\", "Game.exe")
            .build();
        assert_eq!(
            classify_bytes(&link, &decoder),
            ScanOutcome::Shortcut(Some("C:\\Game.exe".to_string()))
        );

        let truncated = &link[..40];
        assert!(matches!(
            classify_bytes(truncated, &decoder),
            ScanOutcome::Failed(_)
        ));

        assert_eq!(classify_bytes(b"#!/bin/sh\n", &decoder), ScanOutcome::Unrecognized);
        assert_eq!(classify_bytes(&[], &decoder), ScanOutcome::Unrecognized);
    }

    #[test]
    fn scan_directory() {
        let dir = std::env::temp_dir().join("bottlescope_scan_test");
        std::fs::create_dir_all(&dir).unwrap();

        let exe = dir.join("game.exe");
        let link = dir.join("Game.lnk");
        let text = dir.join("readme.txt");
        let missing = dir.join("missing.exe");
        std::fs::write(&exe, PeBuilder::new().build()).unwrap();
        std::fs::write(
            &link,
            LinkBuilder::new()
                .flags(LinkFlags::HAS_LINK_INFO)
                .local_link_info("C:\\Games\\", "game.exe")
                .build(),
        )
        .unwrap();
        std::fs::write(&text, b"hello").unwrap();

        let paths = vec![exe, link, text, missing];
        let reports = scan_paths(&paths, DecoderConfig::minimal());

        assert_eq!(reports.len(), 4);
        assert_eq!(reports[0].path, paths[0]);
        assert_eq!(reports[0].outcome, ScanOutcome::Executable(Architecture::X32));
        assert_eq!(
            reports[1].outcome,
            ScanOutcome::Shortcut(Some("C:\\Games\\game.exe".to_string()))
        );
        assert_eq!(reports[2].outcome, ScanOutcome::Unrecognized);
        assert!(matches!(reports[3].outcome, ScanOutcome::Failed(_)));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
