//! Builds the styled status table.
//!
//! Rendering is two passes: a base pass that lays out and borders every cell,
//! then a pass that applies the conditional rules on top of it.

use crate::models::{Status, StatusRecord};

pub const SHEET_NAME: &str = "Network Status";
pub const ALERT_RED: u32 = 0xFF0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Date,
    Time,
    Type,
    Name,
    Location,
    Target,
    Status,
}

pub const COLUMNS: [Column; 7] = [
    Column::Date,
    Column::Time,
    Column::Type,
    Column::Name,
    Column::Location,
    Column::Target,
    Column::Status,
];

impl Column {
    pub fn header(self) -> &'static str {
        match self {
            Column::Date => "Date",
            Column::Time => "Time",
            Column::Type => "Type",
            Column::Name => "Name",
            Column::Location => "Location",
            Column::Target => "Target",
            Column::Status => "Status",
        }
    }

    fn value(self, record: &StatusRecord) -> &str {
        match self {
            Column::Date => &record.date,
            Column::Time => &record.time,
            Column::Type => record.kind.label(),
            Column::Name => &record.name,
            Column::Location => &record.location,
            Column::Target => &record.target,
            Column::Status => record.status.as_str(),
        }
    }

    /// Position in [`COLUMNS`]; the variants are declared in that order.
    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellStyle {
    pub bold: bool,
    pub thin_border: bool,
    /// `None` keeps the default font color.
    pub font_color: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub style: CellStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Equals(String),
}

impl Predicate {
    fn matches(&self, text: &str) -> bool {
        match self {
            Predicate::Equals(expected) => text == expected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    FontColor(u32),
}

impl Effect {
    fn apply(self, style: &mut CellStyle) {
        match self {
            Effect::FontColor(rgb) => style.font_color = Some(rgb),
        }
    }
}

/// Styles a data cell in `column` whenever its text satisfies `predicate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalRule {
    pub column: Column,
    pub predicate: Predicate,
    pub effect: Effect,
}

impl ConditionalRule {
    pub fn offline_alert() -> Self {
        Self {
            column: Column::Status,
            predicate: Predicate::Equals(Status::Offline.as_str().into()),
            effect: Effect::FontColor(ALERT_RED),
        }
    }
}

/// The rendered table, ready for a sink to encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub sheet_name: String,
    pub header: Vec<Cell>,
    pub rows: Vec<Vec<Cell>>,
    /// Width per column, in characters.
    pub column_widths: Vec<usize>,
    pub show_gridlines: bool,
}

impl Report {
    pub fn offline_count(&self) -> usize {
        let status = Column::Status.index();
        self.rows
            .iter()
            .filter(|row| row[status].text == Status::Offline.as_str())
            .count()
    }
}

pub struct Renderer {
    rules: Vec<ConditionalRule>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::with_rules(vec![ConditionalRule::offline_alert()])
    }
}

impl Renderer {
    pub fn with_rules(rules: Vec<ConditionalRule>) -> Self {
        Self { rules }
    }

    pub fn render(&self, records: &[StatusRecord]) -> Report {
        let mut report = base_table(records);
        self.apply_rules(&mut report);
        report
    }

    fn apply_rules(&self, report: &mut Report) {
        for rule in &self.rules {
            let column = rule.column.index();
            for row in &mut report.rows {
                let cell = &mut row[column];
                if rule.predicate.matches(&cell.text) {
                    rule.effect.apply(&mut cell.style);
                }
            }
        }
    }
}

fn base_table(records: &[StatusRecord]) -> Report {
    let bordered = CellStyle { thin_border: true, ..CellStyle::default() };
    let header_style = CellStyle { bold: true, ..bordered };

    let header: Vec<Cell> = COLUMNS
        .iter()
        .map(|column| Cell { text: column.header().into(), style: header_style })
        .collect();

    let rows: Vec<Vec<Cell>> = records
        .iter()
        .map(|record| {
            COLUMNS
                .iter()
                .map(|column| Cell { text: column.value(record).into(), style: bordered })
                .collect()
        })
        .collect();

    let column_widths = (0..COLUMNS.len())
        .map(|i| {
            std::iter::once(&header[i])
                .chain(rows.iter().map(|row| &row[i]))
                .map(|cell| cell.text.chars().count())
                .max()
                .unwrap_or_default()
                + 2
        })
        .collect();

    Report {
        sheet_name: SHEET_NAME.into(),
        header,
        rows,
        column_widths,
        show_gridlines: false,
    }
}
