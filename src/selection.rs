use crate::constants::{EMPTY_SELECTION_LABEL, MAX_FILE_SIZE};
use crate::error::{CompressionError, Result};
use crate::formats::{is_image_file, mime_type_for};
use glob::glob;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// One user-selected image, read fully into memory.
///
/// Files over `MAX_FILE_SIZE` keep their name and size but no bytes; the
/// compressor turns them into a per-file failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    name: String,
    mime_type: String,
    size: u64,
    bytes: Arc<[u8]>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime_type = mime_type_for(&bytes, &name);
        Self {
            name,
            mime_type,
            size: bytes.len() as u64,
            bytes: bytes.into(),
        }
    }

    /// Reads `path`, checking its size on disk first so oversized files are
    /// never loaded.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CompressionError::FileNotFound(path.to_path_buf()));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| CompressionError::FileNotFound(path.to_path_buf()))?;

        let size = fs::metadata(path)?.len();
        if size > MAX_FILE_SIZE {
            crate::verbose!("{} is {} bytes, not reading it", name, size);
            return Ok(Self {
                mime_type: mime_type_for(&[], &name),
                name,
                size,
                bytes: Arc::from(Vec::new()),
            });
        }

        let bytes = fs::read(path)?;
        Ok(Self::new(name, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size on disk, also for files too large to have been read.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_loaded(&self) -> bool {
        self.bytes.len() as u64 == self.size
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }
}

/// The ordered set of files picked in one selection event.
///
/// Cloning is cheap; a run takes its own snapshot so later selections
/// cannot change the files it is working on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    files: Arc<Vec<InputFile>>,
}

impl Selection {
    pub fn new(files: Vec<InputFile>) -> Self {
        Self {
            files: Arc::new(files),
        }
    }

    /// Reads every file named by `inputs`, expanding directories and glob
    /// patterns the way [`collect_image_files`] does.
    pub fn from_paths<S: AsRef<str>>(inputs: &[S], recursive: bool) -> Result<Self> {
        let mut files = Vec::new();
        for input in inputs {
            for path in collect_image_files(input.as_ref(), recursive)? {
                files.push(InputFile::from_path(&path)?);
            }
        }
        crate::verbose!("Selected {} file(s)", files.len());
        Ok(Self::new(files))
    }

    pub fn files(&self) -> &[InputFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(InputFile::size).sum()
    }

    /// Text shown next to the picker for this selection.
    pub fn label(&self) -> String {
        match self.files.as_slice() {
            [] => EMPTY_SELECTION_LABEL.to_string(),
            [single] => single.name().to_string(),
            files => format!("{} files selected.", files.len()),
        }
    }
}

/// Expands one input into image file paths.
///
/// An existing file is taken as-is whatever its extension. A directory is
/// walked (recursively if asked) skipping hidden entries and non-images. Any
/// other input is tried as a glob pattern; no matches is not an error.
pub fn collect_image_files(input: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut image_files = Vec::new();
    let input_path = Path::new(input);

    if input_path.is_file() {
        image_files.push(input_path.to_path_buf());
    } else if input_path.is_dir() {
        let walker = if recursive {
            WalkDir::new(input_path)
        } else {
            WalkDir::new(input_path).max_depth(1)
        };

        let mut entries = Vec::new();
        for entry in walker
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && is_image_file(path) {
                entries.push(path.to_path_buf());
            }
        }
        // Walk order is filesystem dependent
        entries.sort();
        image_files.extend(entries);
    } else {
        let pattern = glob(input).map_err(|_| CompressionError::NoImageFilesFound(input.to_string()))?;
        for entry in pattern.flatten() {
            if entry.is_file() && is_image_file(&entry) {
                image_files.push(entry);
            }
        }
    }

    Ok(image_files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn touch(path: &Path, contents: &[u8]) {
        File::create(path).unwrap().write_all(contents).unwrap();
    }

    #[test]
    fn test_input_file_new() {
        let file = InputFile::new("a.png", vec![0u8; 1000]);
        assert_eq!(file.name(), "a.png");
        assert_eq!(file.size(), 1000);
        // no signature, so the extension decides
        assert_eq!(file.mime_type(), "image/png");
    }

    #[test]
    fn test_input_file_from_path_missing() {
        let result = InputFile::from_path(Path::new("/nonexistent/file.jpg"));
        assert!(matches!(result, Err(CompressionError::FileNotFound(_))));
    }

    #[test]
    fn test_oversized_file_is_not_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("huge.png");
        // sparse, so no real disk space is used
        File::create(&path).unwrap().set_len(MAX_FILE_SIZE + 1).unwrap();

        let file = InputFile::from_path(&path).unwrap();

        assert_eq!(file.name(), "huge.png");
        assert_eq!(file.size(), MAX_FILE_SIZE + 1);
        assert!(file.bytes().is_empty());
        assert!(!file.is_loaded());
        assert_eq!(file.mime_type(), "image/png");
    }

    #[test]
    fn test_oversized_file_fails_alone_in_a_batch() {
        use crate::batch::{run_batch, BatchLimits};
        use crate::compressor::{CompressionOptions, ImageCompressor};
        use image::{Rgb, RgbImage};

        let temp_dir = TempDir::new().unwrap();
        RgbImage::from_pixel(8, 8, Rgb([200, 10, 10]))
            .save(temp_dir.path().join("a_small.png"))
            .unwrap();
        File::create(temp_dir.path().join("b_huge.png"))
            .unwrap()
            .set_len(MAX_FILE_SIZE + 1)
            .unwrap();

        let selection =
            Selection::from_paths(&[temp_dir.path().to_string_lossy().into_owned()], false)
                .unwrap();
        assert_eq!(selection.total_size(), selection.files()[0].size() + MAX_FILE_SIZE + 1);

        let options = CompressionOptions::new(Some(0.5)).unwrap();
        let result = run_batch(
            &ImageCompressor,
            selection.files(),
            &options,
            &BatchLimits::new(2),
            None,
        )
        .unwrap();

        assert_eq!(result.success_pattern(), vec![true, false]);
        let (name, error) = result.failures().next().unwrap();
        assert_eq!(name, "b_huge.png");
        assert!(error.contains("File too large"));
    }

    #[test]
    fn test_selection_label() {
        assert_eq!(Selection::default().label(), "Click here or drag files to upload");

        let one = Selection::new(vec![InputFile::new("cat.jpg", vec![1])]);
        assert_eq!(one.label(), "cat.jpg");

        let two = Selection::new(vec![
            InputFile::new("a.jpg", vec![1]),
            InputFile::new("b.jpg", vec![2]),
        ]);
        assert_eq!(two.label(), "2 files selected.");
    }

    #[test]
    fn test_selection_total_size() {
        let selection = Selection::new(vec![
            InputFile::new("a.png", vec![0; 1000]),
            InputFile::new("b.png", vec![0; 2000]),
        ]);
        assert_eq!(selection.total_size(), 3000);
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn test_collect_explicit_file_keeps_any_extension() {
        let temp_dir = TempDir::new().unwrap();
        let notes = temp_dir.path().join("notes.txt");
        touch(&notes, b"text");

        let files = collect_image_files(&notes.to_string_lossy(), false).unwrap();
        assert_eq!(files, vec![notes]);
    }

    #[test]
    fn test_collect_directory_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("b.png"), b"b");
        touch(&temp_dir.path().join("a.jpg"), b"a");
        touch(&temp_dir.path().join("readme.txt"), b"r");
        touch(&temp_dir.path().join(".hidden.png"), b"h");

        let files = collect_image_files(&temp_dir.path().to_string_lossy(), false).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.png"]);
    }

    #[test]
    fn test_collect_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let subdir = temp_dir.path().join("subdir");
        std::fs::create_dir(&subdir).unwrap();
        touch(&temp_dir.path().join("top.jpg"), b"t");
        touch(&subdir.join("nested.png"), b"n");

        let flat = collect_image_files(&temp_dir.path().to_string_lossy(), false).unwrap();
        assert_eq!(flat.len(), 1);

        let deep = collect_image_files(&temp_dir.path().to_string_lossy(), true).unwrap();
        assert_eq!(deep.len(), 2);
    }

    #[test]
    fn test_collect_glob_pattern() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("one.jpg"), b"1");
        touch(&temp_dir.path().join("two.png"), b"2");

        let pattern = format!("{}/*.jpg", temp_dir.path().to_string_lossy());
        let files = collect_image_files(&pattern, false).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_collect_missing_path_is_empty() {
        let files = collect_image_files("/nonexistent/dir/photo.png", false).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_selection_from_paths_reads_bytes() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("a.png"), &[7u8; 10]);
        touch(&temp_dir.path().join("b.png"), &[9u8; 20]);

        let selection =
            Selection::from_paths(&[temp_dir.path().to_string_lossy().into_owned()], false)
                .unwrap();

        assert_eq!(selection.len(), 2);
        assert_eq!(selection.files()[0].name(), "a.png");
        assert_eq!(selection.files()[1].bytes(), &[9u8; 20][..]);
    }
}
