//! HTML rendering of the labeling page using Handlebars

use handlebars::Handlebars;
use serde::Serialize;
use sous_core::{Result, SousError};

use crate::models::{IngredientView, StatsResponse};

const INDEX_TEMPLATE: &str = include_str!("../templates/index.hbs");

/// Context for the labeling page
#[derive(Debug, Serialize)]
pub struct IndexPage<'a> {
    pub ingredients: &'a [IngredientView],
    /// Choices offered for each token
    pub labels: &'a [String],
    pub stats: Option<StatsResponse>,
}

/// Renders the labeling page
pub struct PageRenderer {
    handlebars: Handlebars<'static>,
}

impl PageRenderer {
    /// Create a renderer with the built-in templates registered
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        handlebars
            .register_template_string("index", INDEX_TEMPLATE)
            .map_err(|e| SousError::ConfigError(format!("Invalid page template: {e}")))?;

        Ok(Self { handlebars })
    }

    /// Render the labeling page
    pub fn render_index(&self, page: &IndexPage<'_>) -> std::result::Result<String, handlebars::RenderError> {
        self.handlebars.render("index", page)
    }
}
