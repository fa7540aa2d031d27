use crate::description::{Register, RegisterDescription, normalize};
use crate::error::Result;
use crate::layout::{COLUMN_SEPARATOR, Layout, negotiate};
use crate::pad_to_width;
use crate::sections::{ResolveMode, Section, resolve};

const RULE: char = '-';
const HEADER_OPEN: &str = "/*";
const HEADER_CLOSE: &str = "#";
const DIVIDER_EDGE: &str = "#";
const FOOTER_OPEN: &str = "#";
const FOOTER_CLOSE: &str = "*/";
const ROW_OPEN: &str = "| ";
const ROW_CLOSE: &str = " |";

/// Renderer parameters.
#[derive(Debug, Clone, Default)]
pub struct RendererSettings {
    pub mode: ResolveMode,
}

/// Turns register descriptions into bordered ASCII diagrams.
#[derive(Debug, Clone, Default)]
pub struct RegisterRenderer {
    settings: RendererSettings,
}

impl RegisterRenderer {
    pub fn new(settings: RendererSettings) -> Self {
        Self { settings }
    }

    pub fn with_default() -> Self {
        Self::new(RendererSettings::default())
    }

    pub fn forgiving() -> Self {
        Self::new(RendererSettings {
            mode: ResolveMode::Forgiving,
        })
    }

    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut RendererSettings {
        &mut self.settings
    }

    /// Validate `description` and draw it. Nothing is drawn on error.
    pub fn render(&self, description: &RegisterDescription) -> Result<String> {
        Ok(self.prepare(description)?.draw())
    }

    /// Run every validation stage and negotiate the layout without drawing.
    pub fn prepare(&self, description: &RegisterDescription) -> Result<Diagram> {
        let register = normalize(description)?;
        let sections = resolve(&register.sections, register.width, self.settings.mode)?;
        let layout = negotiate(&register, &sections);
        Ok(Diagram {
            register,
            sections,
            layout,
        })
    }
}

/// Render `description`, repairing section conflicts when `forgiveness` is set.
pub fn render(description: &RegisterDescription, forgiveness: bool) -> Result<String> {
    RegisterRenderer::new(RendererSettings {
        mode: ResolveMode::from_forgiveness(forgiveness),
    })
    .render(description)
}

/// A validated register with its resolved sections and negotiated layout.
#[derive(Debug, Clone)]
pub struct Diagram {
    pub register: Register,
    pub sections: Vec<Section>,
    pub layout: Layout,
}

impl Diagram {
    /// Rows from top to bottom, without line terminators.
    pub fn rows(&self) -> Vec<String> {
        let layout = &self.layout;
        let mut rows = vec![
            header_row(layout),
            title_row(&self.register, layout),
            divider_row(layout),
        ];
        if layout.section_row {
            rows.push(section_row(&self.sections, layout));
            rows.push(divider_row(layout));
        }
        rows.push(bit_row(self.register.width, layout));
        rows.push(footer_row(layout));
        rows
    }

    /// Newline-joined rows with a single trailing newline.
    pub fn draw(&self) -> String {
        let mut text = self.rows().join("\n");
        text.push('\n');
        text
    }
}

fn rule(open: &str, length: usize, close: &str) -> String {
    let mut line = String::with_capacity(open.len() + length + close.len());
    line.push_str(open);
    line.extend(std::iter::repeat_n(RULE, length));
    line.push_str(close);
    line
}

fn framed(cells: impl IntoIterator<Item = String>) -> String {
    let body: Vec<String> = cells.into_iter().collect();
    format!("{ROW_OPEN}{}{ROW_CLOSE}", body.join(COLUMN_SEPARATOR))
}

fn header_row(layout: &Layout) -> String {
    rule(HEADER_OPEN, layout.global_width + 1, HEADER_CLOSE)
}

fn divider_row(layout: &Layout) -> String {
    rule(DIVIDER_EDGE, layout.global_width + 2, DIVIDER_EDGE)
}

fn footer_row(layout: &Layout) -> String {
    rule(FOOTER_OPEN, layout.global_width + 1, FOOTER_CLOSE)
}

fn title_row(register: &Register, layout: &Layout) -> String {
    format!(
        "{ROW_OPEN}{}{}{}{ROW_CLOSE}",
        register.name,
        " ".repeat(layout.title_space),
        register.address
    )
}

fn section_row(sections: &[Section], layout: &Layout) -> String {
    framed(sections.iter().map(|section| {
        let mut cell = section.name.clone();
        pad_to_width(&mut cell, layout.cell_width(section));
        cell
    }))
}

fn bit_row(width: usize, layout: &Layout) -> String {
    framed((0..width).rev().map(|bit| {
        let mut label = bit.to_string();
        label.push_str(&" ".repeat(layout.expansion_at(bit)));
        label
    }))
}
