//! Paragraph-aligned splitting of long memos.
//!
//! Sizes are measured in chars, never bytes, so a slice boundary can't land
//! inside a multi-byte character.

pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    /// Set on the second and later slices of a paragraph too long for one chunk.
    pub continues_previous: bool,
}

impl Chunk {
    fn whole(text: String) -> Self {
        Self {
            text,
            continues_previous: false,
        }
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Splits `text` into chunks of at most `max_size` chars, packing whole
/// paragraphs up to `target_size`.
pub fn chunk_text(text: &str, target_size: usize, max_size: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut buffer = String::new();
    let mut buffer_len = 0usize;
    let mut buffer_open = false;

    for paragraph in packing_units(text) {
        let paragraph = paragraph.as_str();
        let para_len = paragraph.chars().count();

        if para_len > max_size {
            flush(&mut chunks, &mut buffer, &mut buffer_len, &mut buffer_open);
            chunks.extend(hard_split(paragraph, max_size));
            continue;
        }

        if buffer_open && buffer_len + PARAGRAPH_SEPARATOR.len() + para_len > target_size {
            flush(&mut chunks, &mut buffer, &mut buffer_len, &mut buffer_open);
        }

        if buffer_open {
            buffer.push_str(PARAGRAPH_SEPARATOR);
            buffer_len += PARAGRAPH_SEPARATOR.len();
        }
        buffer.push_str(paragraph);
        buffer_len += para_len;
        buffer_open = true;
    }
    flush(&mut chunks, &mut buffer, &mut buffer_len, &mut buffer_open);

    chunks
}

/// Paragraphs of `text` with blank ones glued onto the next paragraph (or the
/// previous one at the end), so no unit is whitespace-only and joining the
/// units with [`PARAGRAPH_SEPARATOR`] gives back `text`.
fn packing_units(text: &str) -> Vec<String> {
    let mut units: Vec<String> = Vec::new();
    let mut blank_run: Option<String> = None;

    for paragraph in text.split(PARAGRAPH_SEPARATOR) {
        if paragraph.trim().is_empty() {
            match blank_run.as_mut() {
                Some(run) => {
                    run.push_str(PARAGRAPH_SEPARATOR);
                    run.push_str(paragraph);
                }
                None => blank_run = Some(paragraph.to_string()),
            }
            continue;
        }
        let unit = match blank_run.take() {
            Some(mut run) => {
                run.push_str(PARAGRAPH_SEPARATOR);
                run.push_str(paragraph);
                run
            }
            None => paragraph.to_string(),
        };
        units.push(unit);
    }

    if let (Some(run), Some(last)) = (blank_run, units.last_mut()) {
        last.push_str(PARAGRAPH_SEPARATOR);
        last.push_str(&run);
    }
    units
}

fn flush(chunks: &mut Vec<Chunk>, buffer: &mut String, len: &mut usize, open: &mut bool) {
    let text = std::mem::take(buffer);
    if !text.trim().is_empty() {
        chunks.push(Chunk::whole(text));
    }
    *len = 0;
    *open = false;
}

fn hard_split(paragraph: &str, max_size: usize) -> Vec<Chunk> {
    let chars: Vec<char> = paragraph.chars().collect();
    chars
        .chunks(max_size)
        .enumerate()
        .map(|(i, slice)| Chunk {
            text: slice.iter().collect(),
            continues_previous: i > 0,
        })
        .collect()
}

/// Inverse of [`chunk_text`]: blank-line separators between chunks, none
/// before a continuation slice.
pub fn rejoin(chunks: &[Chunk]) -> String {
    let mut out = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        if i > 0 && !chunk.continues_previous {
            out.push_str(PARAGRAPH_SEPARATOR);
        }
        out.push_str(&chunk.text);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(ch: char, len: usize) -> String {
        std::iter::repeat(ch).take(len).collect()
    }

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = chunk_text("one\n\ntwo", 8000, 10000);
        assert_eq!(chunks, vec![Chunk::whole("one\n\ntwo".into())]);
    }

    #[test]
    fn paragraphs_pack_up_to_target() {
        let text = [
            paragraph('a', 3750),
            paragraph('b', 3750),
            paragraph('c', 3750),
            paragraph('d', 3750),
        ]
        .join("\n\n");
        let chunks = chunk_text(&text, 8000, 10000);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].char_len(), 7502);
        assert!(chunks[0].text.starts_with('a') && chunks[0].text.ends_with('b'));
        assert!(chunks[1].text.starts_with('c') && chunks[1].text.ends_with('d'));
        assert_eq!(rejoin(&chunks), text);
    }

    #[test]
    fn oversized_paragraph_is_hard_split() {
        let text = format!(
            "{}\n\n{}\n\n{}",
            paragraph('x', 10),
            paragraph('y', 25),
            paragraph('z', 5)
        );
        let chunks = chunk_text(&text, 8, 10);
        let lens: Vec<usize> = chunks.iter().map(Chunk::char_len).collect();
        assert_eq!(lens, vec![10, 10, 10, 5, 5]);
        let continuation: Vec<bool> = chunks.iter().map(|c| c.continues_previous).collect();
        assert_eq!(continuation, vec![false, false, true, true, false]);
        assert!(chunks.iter().all(|c| c.char_len() <= 10));
        assert_eq!(rejoin(&chunks), text);
    }

    #[test]
    fn paragraph_between_target_and_max_stands_alone() {
        let text = format!("{}\n\n{}", paragraph('a', 3), paragraph('b', 9));
        let chunks = chunk_text(&text, 8, 10);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].char_len(), 9);
        assert_eq!(rejoin(&chunks), text);
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let text = paragraph('é', 25);
        let chunks = chunk_text(&text, 8, 10);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.char_len() <= 10));
        assert_eq!(rejoin(&chunks), text);
    }

    #[test]
    fn no_chunk_is_empty() {
        assert!(chunk_text("", 8, 10).is_empty());
        assert!(chunk_text("\n\n\n\n  ", 8, 10).is_empty());
        let chunks = chunk_text("abc\n\n\n\ndef", 8000, 10000);
        assert_eq!(chunks.len(), 1);
        assert!(chunks.iter().all(|c| !c.text.trim().is_empty()));
    }

    #[test]
    fn blank_paragraph_between_chunks_is_kept() {
        let text = "aaaaaaa\n\n \n\nbbbbbbb";
        let chunks = chunk_text(text, 8, 10);
        assert_eq!(
            chunks,
            vec![
                Chunk::whole("aaaaaaa".into()),
                Chunk::whole(" \n\nbbbbbbb".into())
            ]
        );
        assert_eq!(rejoin(&chunks), text);
    }

    #[test]
    fn blank_paragraphs_at_the_edges_are_kept() {
        let text = "\n\naaaaaaa\n\nbbbbbbb\n\n ";
        let chunks = chunk_text(text, 8, 10);
        assert!(chunks.iter().all(|c| !c.text.trim().is_empty()));
        assert!(chunks.iter().all(|c| c.char_len() <= 10));
        assert_eq!(rejoin(&chunks), text);
    }

    #[test]
    fn chunks_never_exceed_max_for_mixed_input() {
        let mut paras = Vec::new();
        for i in 0..40 {
            paras.push(paragraph('m', (i * 977) % 12_500 + 1));
        }
        let text = paras.join("\n\n");
        let chunks = chunk_text(&text, 8000, 10000);
        assert!(chunks.iter().all(|c| c.char_len() <= 10000));
        assert_eq!(rejoin(&chunks), text);
    }
}
