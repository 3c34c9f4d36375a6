//! Page layout for printable blocks.
//!
//! Layout is pure: the same blocks always produce the same pages, which keeps
//! rendered documents content-deterministic.

use super::markdown::Block;

const PT_PER_MM: f32 = 72.0 / 25.4;
const LINE_SPACING: f32 = 1.4;
const LIST_INDENT_MM: f32 = 6.0;
const CODE_INDENT_MM: f32 = 4.0;

/// Paper size and margins in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSpec {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_mm: f32,
}

impl PageSpec {
    pub fn a4() -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            margin_mm: 20.0,
        }
    }

    fn text_width_mm(&self) -> f32 {
        self.width_mm - 2.0 * self.margin_mm
    }
}

/// Font face of a laid-out line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    Regular,
    Bold,
    Mono,
}

impl FontFace {
    /// Average glyph advance as a fraction of the font size.
    fn average_advance(&self) -> f32 {
        match self {
            FontFace::Regular => 0.5,
            FontFace::Bold => 0.55,
            FontFace::Mono => 0.6,
        }
    }
}

/// A run of text at a fixed position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub x_mm: f32,
    pub y_mm: f32,
    pub size: f32,
    pub face: FontFace,
    pub text: String,
}

/// Text runs for one page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageLayout {
    pub items: Vec<PlacedText>,
}

struct Cursor {
    paper: PageSpec,
    pages: Vec<PageLayout>,
    y_mm: f32,
}

impl Cursor {
    fn new(paper: PageSpec) -> Self {
        Self {
            paper,
            pages: vec![PageLayout::default()],
            y_mm: paper.height_mm - paper.margin_mm,
        }
    }

    fn top(&self) -> f32 {
        self.paper.height_mm - self.paper.margin_mm
    }

    fn gap(&mut self, mm: f32) {
        // Gaps never carry over to a fresh page
        if self.y_mm < self.top() {
            self.y_mm -= mm;
        }
    }

    /// Reserve one line of `size` points and return its baseline.
    fn next_line(&mut self, size: f32) -> f32 {
        let height = line_height_mm(size);
        if self.y_mm - height < self.paper.margin_mm {
            self.pages.push(PageLayout::default());
            self.y_mm = self.top();
        }
        self.y_mm -= height;
        self.y_mm + (height - size / PT_PER_MM) / 2.0
    }

    fn place(&mut self, x_mm: f32, y_mm: f32, size: f32, face: FontFace, text: String) {
        if let Some(page) = self.pages.last_mut() {
            page.items.push(PlacedText {
                x_mm,
                y_mm,
                size,
                face,
                text,
            });
        }
    }

    fn lines(&mut self, x_mm: f32, size: f32, face: FontFace, lines: Vec<String>) {
        for line in lines {
            let y = self.next_line(size);
            self.place(x_mm, y, size, face, line);
        }
    }
}

fn line_height_mm(size: f32) -> f32 {
    size * LINE_SPACING / PT_PER_MM
}

fn heading_size(level: u8, body: f32) -> f32 {
    match level {
        1 => body * 1.6,
        2 => body * 1.35,
        3 => body * 1.2,
        _ => body * 1.05,
    }
}

/// How many glyphs of `face` at `size` fit into `width_mm`.
fn chars_per_line(width_mm: f32, size: f32, face: FontFace) -> usize {
    let width_pt = width_mm * PT_PER_MM;
    ((width_pt / (size * face.average_advance())).floor() as usize).max(1)
}

/// Greedy word wrap. Words longer than a line are split.
pub fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while word.len() > max_chars {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
        if needed > max_chars && current_len > 0 {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }

    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// ASCII spelling for symbols outside the built-in font encoding.
fn transliterate(c: char) -> Option<&'static str> {
    Some(match c {
        '\u{2192}' | '\u{27F6}' => "->",
        '\u{2190}' | '\u{27F5}' => "<-",
        '\u{2194}' => "<->",
        '\u{21D2}' | '\u{27F9}' => "=>",
        '\u{21D0}' => "<=",
        '\u{21D4}' | '\u{27FA}' => "<=>",
        '\u{2191}' => "^",
        '\u{2193}' => "v",
        '\u{2264}' => "<=",
        '\u{2265}' => ">=",
        '\u{2260}' => "!=",
        '\u{2248}' => "~=",
        '\u{2261}' => "==",
        '\u{221D}' => "~",
        '\u{221E}' => "inf",
        '\u{221A}' => "sqrt",
        '\u{2211}' => "sum",
        '\u{220F}' => "prod",
        '\u{222B}' => "integral",
        '\u{2202}' => "d",
        '\u{2207}' => "nabla",
        '\u{0394}' | '\u{2206}' => "Delta",
        '\u{2208}' => " in ",
        '\u{2209}' => " not in ",
        '\u{2200}' => "for all ",
        '\u{2203}' => "exists ",
        '\u{2227}' => " and ",
        '\u{2228}' => " or ",
        '\u{00AC}' => "not ",
        '\u{2229}' => " n ",
        '\u{222A}' => " u ",
        '\u{2282}' | '\u{2286}' => " subset of ",
        '\u{2234}' => "therefore",
        '\u{22C5}' | '\u{2219}' => "*",
        '\u{2713}' | '\u{2714}' | '\u{2705}' => "[x]",
        '\u{2717}' | '\u{2718}' | '\u{274C}' => "[ ]",
        '\u{03B1}' => "alpha",
        '\u{03B2}' => "beta",
        '\u{03B3}' => "gamma",
        '\u{03B4}' => "delta",
        '\u{03B5}' => "epsilon",
        '\u{03B6}' => "zeta",
        '\u{03B7}' => "eta",
        '\u{03B8}' => "theta",
        '\u{03B9}' => "iota",
        '\u{03BA}' => "kappa",
        '\u{03BB}' => "lambda",
        '\u{03BC}' => "mu",
        '\u{03BD}' => "nu",
        '\u{03BE}' => "xi",
        '\u{03C0}' => "pi",
        '\u{03C1}' => "rho",
        '\u{03C3}' | '\u{03C2}' => "sigma",
        '\u{03C4}' => "tau",
        '\u{03C6}' | '\u{03D5}' => "phi",
        '\u{03C7}' => "chi",
        '\u{03C8}' => "psi",
        '\u{03C9}' => "omega",
        '\u{0393}' => "Gamma",
        '\u{0398}' => "Theta",
        '\u{039B}' => "Lambda",
        '\u{03A0}' => "Pi",
        '\u{03A3}' => "Sigma",
        '\u{03A6}' => "Phi",
        '\u{03A8}' => "Psi",
        '\u{03A9}' | '\u{2126}' => "Omega",
        '\u{2070}' => "^0",
        '\u{2074}' => "^4",
        '\u{2075}' => "^5",
        '\u{2076}' => "^6",
        '\u{2077}' => "^7",
        '\u{2078}' => "^8",
        '\u{2079}' => "^9",
        '\u{207F}' => "^n",
        '\u{2080}' => "_0",
        '\u{2081}' => "_1",
        '\u{2082}' => "_2",
        '\u{2083}' => "_3",
        '\u{2084}' => "_4",
        '\u{2026}' => "...",
        '\u{2122}' => "(TM)",
        _ => return None,
    })
}

/// Replace characters the built-in PDF fonts cannot show.
///
/// Latin-1 passes through, common math and Greek symbols are spelled out in
/// ASCII, anything else becomes `?`.
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if let Some(ascii) = transliterate(c) {
            out.push_str(ascii);
            continue;
        }
        out.push(match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => '"',
            '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
            '\u{2022}' | '\u{25CF}' | '\u{25AA}' => '*',
            '\u{00A0}' | '\u{2009}' | '\u{202F}' => ' ',
            '\t' => ' ',
            c if (' '..='~').contains(&c) => c,
            c if ('\u{00A1}'..='\u{00FF}').contains(&c) => c,
            _ => '?',
        });
    }
    out
}

/// Lay out blocks onto pages.
pub fn layout(blocks: &[Block], paper: PageSpec, body_size: f32) -> Vec<PageLayout> {
    let mut cursor = Cursor::new(paper);
    let left = paper.margin_mm;
    let width = paper.text_width_mm();
    let body_gap = line_height_mm(body_size) * 0.4;

    for block in blocks {
        match block {
            Block::Heading { level, text } => {
                let size = heading_size(*level, body_size);
                cursor.gap(line_height_mm(body_size) * 0.6);
                let lines = wrap(&normalize_text(text), chars_per_line(width, size, FontFace::Bold));
                cursor.lines(left, size, FontFace::Bold, lines);
                cursor.gap(body_gap);
            }
            Block::Paragraph(text) => {
                let lines = wrap(&normalize_text(text), chars_per_line(width, body_size, FontFace::Regular));
                cursor.lines(left, body_size, FontFace::Regular, lines);
                cursor.gap(body_gap);
            }
            Block::ListItem { depth, marker, text } => {
                let marker_x = left + LIST_INDENT_MM * *depth as f32;
                let text_x = marker_x + LIST_INDENT_MM;
                let max = chars_per_line(left + width - text_x, body_size, FontFace::Regular);
                let lines = wrap(&normalize_text(text), max);

                for (i, line) in lines.into_iter().enumerate() {
                    let y = cursor.next_line(body_size);
                    if i == 0 && !marker.is_empty() {
                        cursor.place(marker_x, y, body_size, FontFace::Regular, marker.clone());
                    }
                    cursor.place(text_x, y, body_size, FontFace::Regular, line);
                }
                cursor.gap(body_gap * 0.5);
            }
            Block::Code(code) => {
                let size = body_size * 0.9;
                let x = left + CODE_INDENT_MM;
                let max = chars_per_line(width - CODE_INDENT_MM, size, FontFace::Mono);
                let lines: Vec<String> = code
                    .lines()
                    .flat_map(|line| {
                        let line = normalize_text(line);
                        let chars: Vec<char> = line.chars().collect();
                        if chars.is_empty() {
                            vec![String::new()]
                        } else {
                            chars.chunks(max).map(|c| c.iter().collect()).collect()
                        }
                    })
                    .collect();
                cursor.lines(x, size, FontFace::Mono, lines);
                cursor.gap(body_gap);
            }
            Block::Rule => {
                let max = chars_per_line(width, body_size, FontFace::Regular);
                let y = cursor.next_line(body_size);
                cursor.place(left, y, body_size, FontFace::Regular, "_".repeat(max));
                cursor.gap(body_gap);
            }
        }
    }

    cursor.pages
}
