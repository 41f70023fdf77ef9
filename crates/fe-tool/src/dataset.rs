use std::fs;
use std::path::Path;

use fe_core::{FlowField, Mask};
use fe_flo::read_flo;
use tracing::debug;

use crate::error::EvalError;
use crate::io::load_mask;

pub const FLOW1_FILE: &str = "flow1.flo";
pub const FLOW2_FILE: &str = "flow2.flo";
pub const MASK1_FILE: &str = "mask1.png";
pub const MASK2_FILE: &str = "mask2.png";
pub const PAIR_FILE: &str = "pair.txt";
pub const FLIP_FILE: &str = "flip_gt.txt";
pub const IMAGE1_FILE: &str = "image1.png";
pub const IMAGE2_FILE: &str = "image2.png";

/// Flows and masks found in one case directory.
#[derive(Debug, Clone, Default)]
pub struct CaseData {
    /// Forward and backward flow; both or neither.
    pub flows: Option<(FlowField, FlowField)>,
    pub mask1: Option<Mask>,
    pub mask2: Option<Mask>,
}

impl CaseData {
    /// Loads whatever the directory provides. Unreadable files count as absent.
    pub fn load(dir: &Path) -> Self {
        let flows = match (read_flo(dir.join(FLOW1_FILE)), read_flo(dir.join(FLOW2_FILE))) {
            (Ok(f1), Ok(f2)) => Some((f1, f2)),
            (Err(err), _) | (_, Err(err)) => {
                debug!("no flow pair in {}: {err}", dir.display());
                None
            }
        };

        let mask = |name: &str| {
            load_mask(&dir.join(name))
                .inspect_err(|err| debug!("no mask {name} in {}: {err}", dir.display()))
                .ok()
        };

        Self {
            flows,
            mask1: mask(MASK1_FILE),
            mask2: mask(MASK2_FILE),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_none() && self.mask1.is_none() && self.mask2.is_none()
    }
}

/// Sorted names of the sub-directories of `root`.
pub fn list_cases(root: &Path) -> Result<Vec<String>, EvalError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(root).map_err(EvalError::io(root))? {
        let entry = entry.map_err(EvalError::io(root))?;
        if entry.file_type().map_err(EvalError::io(entry.path()))?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Source and reference image names from `pair.txt`.
///
/// Each of the first two lines may hold `src,ref`; the last one that parses
/// wins.
pub fn read_pair_names(dir: &Path) -> Option<(String, String)> {
    let text = fs::read_to_string(dir.join(PAIR_FILE)).ok()?;
    text.lines().take(2).filter_map(parse_pair_line).last()
}

fn parse_pair_line(line: &str) -> Option<(String, String)> {
    let (src, rest) = line.trim_end_matches('\r').split_once(',')?;
    let reference = rest.split(',').next().unwrap_or_default();
    if src.is_empty() || reference.is_empty() {
        return None;
    }
    Some((src.to_owned(), reference.to_owned()))
}

/// Ground-truth flip flag from `flip_gt.txt`, `0` when absent or malformed.
pub fn read_flip_flag(dir: &Path) -> i32 {
    fs::read_to_string(dir.join(FLIP_FILE))
        .ok()
        .and_then(|text| text.split_whitespace().next()?.parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use fe_core::{Image, Vec2f};
    use fe_flo::write_flo;

    use super::{
        CaseData, FLIP_FILE, FLOW1_FILE, FLOW2_FILE, MASK2_FILE, PAIR_FILE, list_cases,
        parse_pair_line, read_flip_flag, read_pair_names,
    };
    use crate::io::save_mask;

    #[test]
    fn pair_lines() {
        assert_eq!(
            parse_pair_line("a.png,b.png"),
            Some(("a.png".into(), "b.png".into()))
        );
        assert_eq!(
            parse_pair_line("a,b,c\r"),
            Some(("a".into(), "b".into()))
        );
        assert_eq!(parse_pair_line("no comma"), None);
        assert_eq!(parse_pair_line(",b"), None);
    }

    #[test]
    fn pair_file_last_of_two_lines_wins() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert_eq!(read_pair_names(dir.path()), None);

        fs::write(dir.path().join(PAIR_FILE), "a,b\nc,d\ne,f\n").expect("write");
        assert_eq!(
            read_pair_names(dir.path()),
            Some(("c".into(), "d".into()))
        );

        fs::write(dir.path().join(PAIR_FILE), "a,b\ngarbage\n").expect("write");
        assert_eq!(
            read_pair_names(dir.path()),
            Some(("a".into(), "b".into()))
        );
    }

    #[test]
    fn flip_flag_defaults_to_zero() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert_eq!(read_flip_flag(dir.path()), 0);

        fs::write(dir.path().join(FLIP_FILE), "1\n").expect("write");
        assert_eq!(read_flip_flag(dir.path()), 1);

        fs::write(dir.path().join(FLIP_FILE), "yes").expect("write");
        assert_eq!(read_flip_flag(dir.path()), 0);
    }

    #[test]
    fn flows_load_as_a_pair_and_masks_independently() {
        let dir = tempfile::tempdir().expect("temp dir");
        let flow = Image::new_fill(3, 2, Vec2f::new(1.0, 0.0));
        write_flo(dir.path().join(FLOW1_FILE), &flow.as_view()).expect("write");
        save_mask(&dir.path().join(MASK2_FILE), &Image::new_fill(3, 2, 255u8)).expect("write");

        let data = CaseData::load(dir.path());
        assert!(data.flows.is_none());
        assert!(data.mask1.is_none());
        assert!(data.mask2.is_some());
        assert!(!data.is_empty());

        write_flo(dir.path().join(FLOW2_FILE), &flow.as_view()).expect("write");
        let data = CaseData::load(dir.path());
        let (f1, f2) = data.flows.expect("both flows present");
        assert_eq!((f1.size(), f2.size()), (flow.size(), flow.size()));

        // A malformed second flow drops the pair again.
        fs::write(dir.path().join(FLOW2_FILE), b"PIEH").expect("write");
        assert!(CaseData::load(dir.path()).flows.is_none());
    }

    #[test]
    fn cases_are_sorted_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        for name in ["b", "a", "c"] {
            fs::create_dir(dir.path().join(name)).expect("mkdir");
        }
        fs::write(dir.path().join("scores.csv"), "").expect("write");

        assert_eq!(list_cases(dir.path()).expect("listable"), vec!["a", "b", "c"]);
        assert!(list_cases(&dir.path().join("missing")).is_err());
    }
}
