use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::TargetNumber;

/// Target number list, one raw number per line.
#[derive(Debug, Clone)]
pub struct TargetList {
    path: PathBuf,
}

impl TargetList {
    /// List at `<data_dir>/target_numbers/numbers.txt`.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("target_numbers").join("numbers.txt"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Numbers in file order, or `None` if the file does not exist.
    ///
    /// Leading and trailing blank lines are dropped and trailing whitespace is stripped
    /// from each entry. Interior blank lines are kept so they show up in the report.
    pub fn load(&self) -> io::Result<Option<Vec<TargetNumber>>> {
        let Some(data) = super::read_optional(&self.path)? else {
            debug!(path = %self.path.display(), "target list not found");
            return Ok(None);
        };

        let numbers = data
            .trim()
            .lines()
            .map(|line| TargetNumber::new(line.trim_end()))
            .collect::<Vec<_>>();
        debug!(path = %self.path.display(), count = numbers.len(), "target list loaded");
        Ok(Some(numbers))
    }

    /// Replace the list with `numbers`, one per line, trailing whitespace stripped.
    pub fn save<S: AsRef<str>>(&self, numbers: &[S]) -> io::Result<()> {
        info!(path = %self.path.display(), count = numbers.len(), "saving target list");
        let mut data = numbers
            .iter()
            .map(|n| n.as_ref().trim_end())
            .collect::<Vec<_>>()
            .join("\n");
        data.push('\n');
        super::write_file(&self.path, &data)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn missing_file_is_none() {
        let temp_dir = tempdir().unwrap();
        assert_eq!(TargetList::new(temp_dir.path()).load().unwrap(), None);
    }

    #[test]
    fn load_strips_trailing_whitespace_and_keeps_order() {
        let temp_dir = tempdir().unwrap();
        let list = TargetList::new(temp_dir.path());
        std::fs::create_dir_all(list.path().parent().unwrap()).unwrap();
        std::fs::write(
            list.path(),
            "6281234567890  \r\n12345\n\n6289876543210\t\n\n",
        )
        .unwrap();

        let numbers = list.load().unwrap().unwrap();
        let raw = numbers.iter().map(TargetNumber::raw).collect::<Vec<_>>();
        assert_eq!(raw, vec!["6281234567890", "12345", "", "6289876543210"]);
    }

    #[test]
    fn save_keeps_leading_whitespace() {
        let temp_dir = tempdir().unwrap();
        let list = TargetList::new(temp_dir.path());
        list.save(&["6281234567890", " 6289876543210 \t"]).unwrap();

        assert_eq!(
            std::fs::read_to_string(list.path()).unwrap(),
            "6281234567890\n 6289876543210\n"
        );
        let numbers = list.load().unwrap().unwrap();
        assert_eq!(numbers[1].raw(), " 6289876543210");
        assert!(!numbers[1].is_valid());
    }

    #[test]
    fn empty_file_is_an_empty_list() {
        let temp_dir = tempdir().unwrap();
        let list = TargetList::new(temp_dir.path());
        list.save::<&str>(&[]).unwrap();
        assert_eq!(list.load().unwrap(), Some(Vec::new()));
    }

    #[test]
    fn save_then_load_round_trips() {
        let temp_dir = tempdir().unwrap();
        let list = TargetList::new(temp_dir.path());
        list.save(&["6281234567890", "6289876543210"]).unwrap();

        let numbers = list.load().unwrap().unwrap();
        assert_eq!(
            numbers,
            vec![
                TargetNumber::new("6281234567890"),
                TargetNumber::new("6289876543210")
            ]
        );
    }
}
