use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Reads a whole stream and returns all its lines as a `Vec<String>`.
///
/// - Splits on `\n` / `\r\n`
/// - A trailing newline does not produce an empty last line
/// - Fails with `InvalidData` if the stream is not UTF-8
pub(crate) fn read_lines<R: Read>(mut reader: R) -> io::Result<Vec<String>> {
	let mut contents = String::new();
	reader.read_to_string(&mut contents)?;
	Ok(contents.lines().map(str::to_owned).collect())
}

/// Reads a text file and returns all its lines as a `Vec<String>`.
pub(crate) fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	read_lines(File::open(filename)?)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn splits_unix_and_windows_line_endings() {
		let lines = read_lines("frog\r\nelephant\nowl\n".as_bytes()).unwrap();
		assert_eq!(lines, vec!["frog", "elephant", "owl"]);
	}

	#[test]
	fn rejects_non_utf8_streams() {
		let error = read_lines(&[0x66, 0xff, 0x0a][..]).unwrap_err();
		assert_eq!(error.kind(), io::ErrorKind::InvalidData);
	}

	#[test]
	fn missing_file_is_not_found() {
		let error = read_file("./does/not/exist.txt").unwrap_err();
		assert_eq!(error.kind(), io::ErrorKind::NotFound);
	}
}
