use file_reader::{FastaReader, LineSource};
use std::io::Write;

fn write_fixture(contents: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    f.flush().unwrap();
    f
}

#[test]
fn loads_file_and_yields_every_line_once() {
    let fixture = write_fixture(">seq1\nACGTN\n\n>seq2\nTTAA\n");
    let mut reader = FastaReader::open(fixture.path()).unwrap();

    let mut buf = Vec::new();
    let mut lines = Vec::new();
    loop {
        let n = reader.next_line(&mut buf);
        if n == 0 {
            break;
        }
        lines.push(String::from_utf8(buf.clone()).unwrap());
    }
    assert_eq!(lines, vec![">seq1\n", "ACGTN\n", ">seq2\n", "TTAA\n"]);
}

#[test]
fn rewind_allows_scanning_the_same_file_many_times() {
    let fixture = write_fixture("ACGT\n");
    let mut reader = FastaReader::open(fixture.path()).unwrap();
    let mut buf = Vec::new();

    for _ in 0..3 {
        reader.rewind();
        assert_eq!(reader.next_line(&mut buf), 5);
        assert_eq!(reader.next_line(&mut buf), 0);
    }
}
