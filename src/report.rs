//! Printable documents: appointment slip, revenue report, medical certificate.
//!
//! Each document is rendered twice: an HTML page (all field values
//! escaped) and an A4 PDF via `printpdf` that continues onto further
//! pages when the body is long. Both are handed to a [`PrintSurface`]. The default surface writes them to the exports dir.
//!
//! The PDF uses the builtin Helvetica font, which has no Thai glyphs:
//! labels are English and characters outside ASCII print as `?`.

use std::io::BufWriter;
use std::path::{Path, PathBuf};

use printpdf::*;

use crate::config;
use crate::models::{Appointment, Certificate, RevenueEntry};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("Cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Print surface unavailable: {0}")]
    Surface(String),
}

impl ReportError {
    pub fn user_message(&self) -> String {
        match self {
            ReportError::Pdf(_) => "สร้างเอกสารไม่สำเร็จ".to_string(),
            ReportError::Io { .. } | ReportError::Surface(_) => "พิมพ์เอกสารไม่สำเร็จ".to_string(),
        }
    }
}

/// A rendered document, ready for a print surface.
#[derive(Debug, Clone)]
pub struct Document {
    pub title: String,
    /// File name without extension.
    pub file_stem: String,
    pub html: String,
    pub pdf: Vec<u8>,
}

// ═══════════════════════════════════════════════════════════
// Print surfaces
// ═══════════════════════════════════════════════════════════

/// Where a finished document goes.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct PrintReceipt {
    pub html_path: Option<PathBuf>,
    pub pdf_path: Option<PathBuf>,
}

pub trait PrintSurface: Send + Sync {
    fn present(&self, document: &Document) -> Result<PrintReceipt, ReportError>;
}

/// Writes `<stem>.html` and `<stem>.pdf` into a directory.
#[derive(Debug, Clone)]
pub struct FilePrintSurface {
    dir: PathBuf,
}

impl FilePrintSurface {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Surface over [`config::exports_dir`].
    pub fn from_config() -> Self {
        Self::new(config::exports_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write(&self, name: String, bytes: &[u8]) -> Result<PathBuf, ReportError> {
        let path = self.dir.join(name);
        std::fs::write(&path, bytes).map_err(|source| ReportError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

impl PrintSurface for FilePrintSurface {
    fn present(&self, document: &Document) -> Result<PrintReceipt, ReportError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| ReportError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let html_path = self.write(format!("{}.html", document.file_stem), document.html.as_bytes())?;
        let pdf_path = self.write(format!("{}.pdf", document.file_stem), &document.pdf)?;

        tracing::info!(
            title = %document.title,
            html = %html_path.display(),
            pdf = %pdf_path.display(),
            "Document exported"
        );
        Ok(PrintReceipt {
            html_path: Some(html_path),
            pdf_path: Some(pdf_path),
        })
    }
}

// ═══════════════════════════════════════════════════════════
// Documents
// ═══════════════════════════════════════════════════════════

pub fn appointment_slip(apt: &Appointment) -> Result<Document, ReportError> {
    let html = format!(
        r#"<html><head><title>ใบนัดหมาย</title>
<style>body{{font-family:Arial;padding:40px}}h1{{color:#10b981}}.info{{margin:20px 0;line-height:2}}</style>
</head><body>
<h1>🏥 ใบนัดหมาย</h1>
<div class="info">
<p><strong>ชื่อผู้ป่วย:</strong> {name}</p>
<p><strong>วันที่นัด:</strong> {date}</p>
<p><strong>เวลา:</strong> {time} น.</p>
<p><strong>ประเภท:</strong> {kind}</p>
<p><strong>สถานะ:</strong> {status}</p>
</div>
<p style="margin-top:40px">กรุณามาตรงเวลา</p>
</body></html>
"#,
        name = escape_html(&apt.patient_name),
        date = escape_html(&apt.date),
        time = escape_html(&apt.time),
        kind = escape_html(apt.appointment_type.label()),
        status = escape_html(apt.status.label()),
    );

    let body = vec![
        format!("Patient: {}", apt.patient_name),
        format!("Date: {}", apt.date),
        format!("Time: {}", apt.time),
        format!("Type: {}", apt.appointment_type.as_str()),
        format!("Status: {}", apt.status.as_str()),
    ];
    let pdf = render_pdf("APPOINTMENT SLIP", &body, "Please arrive on time.")?;

    Ok(Document {
        title: "ใบนัดหมาย".into(),
        file_stem: file_stem(&["appointment", &apt.id.to_string(), &apt.date]),
        html,
        pdf,
    })
}

pub fn revenue_report(rows: &[RevenueEntry], generated_on: &str) -> Result<Document, ReportError> {
    let total_amount: u64 = rows.iter().map(|r| r.amount).sum();
    let total_services: u32 = rows.iter().map(|r| r.services).sum();

    let table_rows: String = rows
        .iter()
        .map(|r| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&r.date),
                escape_html(&r.service_type),
                r.services,
                format_baht(r.amount)
            )
        })
        .collect();

    let html = format!(
        r#"<html><head><title>รายงานรายได้</title>
<style>body{{font-family:Arial;padding:40px}}table{{width:100%;border-collapse:collapse}}th,td{{border:1px solid #ddd;padding:8px;text-align:left}}</style>
</head><body>
<h1>รายงานรายได้คลินิก</h1>
<table>
<tr><th>วันที่</th><th>ประเภท</th><th>จำนวน</th><th>รายได้</th></tr>
{table_rows}
<tr><td colspan="2"><b>รวม</b></td><td><b>{total_services}</b></td><td><b>{total}</b></td></tr>
</table>
</body></html>
"#,
        total = format_baht(total_amount),
    );

    let mut body: Vec<String> = rows
        .iter()
        .map(|r| format!("{}   {} services   {} THB", r.date, r.services, format_baht(r.amount)))
        .collect();
    body.push(String::new());
    body.push(format!(
        "Total: {} services   {} THB",
        total_services,
        format_baht(total_amount)
    ));
    let pdf = render_pdf("CLINIC REVENUE REPORT", &body, &format!("Generated {generated_on}"))?;

    Ok(Document {
        title: "รายงานรายได้คลินิก".into(),
        file_stem: file_stem(&["revenue-report", generated_on]),
        html,
        pdf,
    })
}

pub fn medical_certificate(cert: &Certificate) -> Result<Document, ReportError> {
    let leave = match (&cert.start_date, &cert.end_date) {
        (Some(start), Some(end)) => format!(
            "<p><strong>ลาป่วยตั้งแต่วันที่:</strong> {} <strong>ถึงวันที่:</strong> {}</p>\n",
            escape_html(start),
            escape_html(end)
        ),
        (Some(start), None) => format!(
            "<p><strong>ลาป่วยตั้งแต่วันที่:</strong> {}</p>\n",
            escape_html(start)
        ),
        _ => String::new(),
    };

    let html = format!(
        r#"<html><head><title>{kind}</title>
<style>body{{font-family:Arial;padding:40px}}h1{{color:#2563eb}}.info{{margin:20px 0;line-height:2}}.sign{{margin-top:60px;text-align:right}}</style>
</head><body>
<h1>{kind}</h1>
<div class="info">
<p><strong>ชื่อผู้ป่วย:</strong> {name}</p>
<p><strong>รายละเอียด:</strong> {details}</p>
{leave}<p><strong>วันที่ออกใบรับรอง:</strong> {issued}</p>
</div>
<div class="sign">
<p>ลงชื่อ ........................................</p>
<p>({doctor})</p>
<p>แพทย์ผู้ตรวจ</p>
</div>
</body></html>
"#,
        kind = escape_html(cert.certificate_type.label()),
        name = escape_html(&cert.patient_name),
        details = escape_html(&cert.details),
        issued = escape_html(&cert.issued_on),
        doctor = escape_html(&cert.doctor),
    );

    let mut body = vec![
        format!("Type: {}", cert.certificate_type.as_str()),
        format!("Patient: {}", cert.patient_name),
    ];
    body.extend(wrap_text(&format!("Details: {}", cert.details), 80));
    if let Some(start) = &cert.start_date {
        body.push(format!(
            "Sick leave: {} to {}",
            start,
            cert.end_date.as_deref().unwrap_or("-")
        ));
    }
    body.push(format!("Issued: {}", cert.issued_on));
    let pdf = render_pdf("MEDICAL CERTIFICATE", &body, &format!("Physician: {}", cert.doctor))?;

    Ok(Document {
        title: cert.certificate_type.label().into(),
        file_stem: file_stem(&["certificate", &cert.id.to_string(), &cert.issued_on]),
        html,
        pdf,
    })
}

// ═══════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `15000` → `15,000`
pub fn format_baht(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn file_stem(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| {
            p.chars()
                .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Builtin PDF fonts only cover Latin text.
fn pdf_safe(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { '?' })
        .collect()
}

// ── PDF layout ───────────────────────────────────────────

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const LEFT_MM: f32 = 20.0;
const TOP_MM: f32 = 280.0;
const BOTTOM_MM: f32 = 20.0;
const LINE_MM: f32 = 6.0;
const WRAP_CHARS: usize = 90;

/// One line of text at a fixed height on its page.
#[derive(Debug, Clone, PartialEq)]
struct Placed {
    text: String,
    size: f32,
    y: f32,
    bold: bool,
}

/// Accumulates placed lines and starts a new page at the bottom margin.
struct PageFlow {
    pages: Vec<Vec<Placed>>,
    current: Vec<Placed>,
    y: f32,
}

impl PageFlow {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            y: TOP_MM,
        }
    }

    fn place(&mut self, text: String, size: f32, bold: bool, advance: f32) {
        if self.y < BOTTOM_MM {
            self.pages.push(std::mem::take(&mut self.current));
            self.y = TOP_MM;
        }
        self.current.push(Placed {
            text,
            size,
            y: self.y,
            bold,
        });
        self.y -= advance;
    }

    fn skip(&mut self, gap: f32) {
        self.y -= gap;
    }

    fn finish(mut self) -> Vec<Vec<Placed>> {
        self.pages.push(self.current);
        self.pages
    }
}

/// Title, wrapped body and footer laid out over as many A4 pages as needed.
fn paginate(title: &str, body: &[String], footer: &str) -> Vec<Vec<Placed>> {
    let mut flow = PageFlow::new();
    flow.place(pdf_safe(title), 14.0, true, 10.0);
    for line in body {
        for wrapped in wrap_text(&pdf_safe(line), WRAP_CHARS) {
            flow.place(wrapped, 10.0, false, LINE_MM);
        }
    }
    flow.skip(8.0 - LINE_MM);
    flow.place(pdf_safe(footer), 10.0, true, LINE_MM);
    flow.finish()
}

fn render_pdf(title: &str, body: &[String], footer: &str) -> Result<Vec<u8>, ReportError> {
    let pages = paginate(title, body, footer);

    let (doc, page1, layer1) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Pdf(format!("font: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::Pdf(format!("font: {e}")))?;

    for (index, lines) in pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(page1).get_layer(layer1)
        } else {
            let (page, layer) = doc.add_page(
                Mm(PAGE_WIDTH_MM),
                Mm(PAGE_HEIGHT_MM),
                format!("Layer {}", index + 1),
            );
            doc.get_page(page).get_layer(layer)
        };
        for line in lines {
            let face = if line.bold { &bold } else { &font };
            layer.use_text(line.text.as_str(), line.size, Mm(LEFT_MM), Mm(line.y), face);
        }
    }
    tracing::debug!(title, pages = pages.len(), "PDF laid out");

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ReportError::Pdf(format!("save: {e}")))?;
    buf.into_inner()
        .map_err(|e| ReportError::Pdf(format!("buffer: {e}")))
}

fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.len() + word.len() + 1 > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
