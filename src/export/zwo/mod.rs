//! ZWO (Zwift workout) export
//!
//! Generates Zwift workout files. Only bike and run workouts can be
//! represented; everything else is rejected before any conversion happens.
//!
//! To import into Zwift, save the file to `Documents/Zwift/Workouts/<user id>/`.

pub mod segments;
pub mod structure;

use std::borrow::Cow;
use std::io::Write;

use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::debug;

use crate::models::{Sport, Workout};

use super::{ExportError, ExportFormat, WorkoutExporter};
use segments::Segment;

/// Author written into every generated file unless configured otherwise
pub const DEFAULT_AUTHOR: &str = "Claude Coach";

/// Whether ZWO can represent workouts of this sport
pub fn is_supported(sport: Sport) -> bool {
    matches!(sport, Sport::Bike | Sport::Run)
}

fn sport_type(sport: Sport) -> &'static str {
    match sport {
        Sport::Run => "run",
        _ => "bike",
    }
}

/// Escape the five reserved XML characters, ampersand first
pub fn escape_xml(text: &str) -> Cow<'_, str> {
    escape(text)
}

/// Description text: the workout description followed by its human-readable
/// summary, separated by a blank line.
///
/// Literal `\n` sequences in the summary become real newlines.
pub fn build_description(workout: &Workout) -> String {
    let mut description = workout.description.clone();
    if let Some(summary) = workout.human_readable.as_deref().filter(|s| !s.is_empty()) {
        description.push_str("\n\n");
        description.push_str(&summary.replace("\\n", "\n"));
    }
    description
}

impl From<quick_xml::Error> for ExportError {
    fn from(err: quick_xml::Error) -> Self {
        ExportError::SerializationError(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ZwoExporter {
    author: String,
}

impl Default for ZwoExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ZwoExporter {
    pub fn new() -> Self {
        Self::with_author(DEFAULT_AUTHOR)
    }

    pub fn with_author(author: impl Into<String>) -> Self {
        Self {
            author: author.into(),
        }
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    /// Render a complete ZWO document for one workout
    pub fn generate_zwo(&self, workout: &Workout) -> Result<String, ExportError> {
        if !is_supported(workout.sport) {
            return Err(ExportError::UnsupportedSport {
                format: ExportFormat::Zwo,
                sport: workout.sport,
            });
        }

        let structure = structure::resolve(workout);
        let segments = segments::emit_structure(&structure);
        debug!(
            workout = %workout.id,
            segments = segments.len(),
            "Emitted ZWO segments"
        );

        self.assemble(workout, &segments)
    }

    fn assemble(&self, workout: &Workout, segments: &[Segment]) -> Result<String, ExportError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Text(BytesText::new("\n")))?;
        writer.write_event(Event::Start(BytesStart::new("workout_file")))?;

        Self::write_text_element(&mut writer, "author", &self.author)?;
        Self::write_text_element(&mut writer, "name", &workout.name)?;
        Self::write_text_element(&mut writer, "description", &build_description(workout))?;
        Self::write_text_element(&mut writer, "sportType", sport_type(workout.sport))?;

        writer.write_event(Event::Start(BytesStart::new("workout")))?;
        for segment in segments {
            Self::write_segment(&mut writer, segment)?;
        }
        writer.write_event(Event::End(BytesEnd::new("workout")))?;

        writer.write_event(Event::End(BytesEnd::new("workout_file")))?;

        let bytes = writer.into_inner();
        String::from_utf8(bytes).map_err(|err| ExportError::SerializationError(err.to_string()))
    }

    fn write_segment<W: Write>(writer: &mut Writer<W>, segment: &Segment) -> Result<(), ExportError> {
        let mut element = BytesStart::new(segment.element_name());
        for (name, value) in segment.attributes() {
            element.push_attribute((name, value.as_str()));
        }
        writer.write_event(Event::Empty(element))?;
        Ok(())
    }

    fn write_text_element<W: Write>(
        writer: &mut Writer<W>,
        name: &str,
        value: &str,
    ) -> Result<(), ExportError> {
        writer.write_event(Event::Start(BytesStart::new(name)))?;
        writer.write_event(Event::Text(BytesText::from_escaped(escape_xml(value))))?;
        writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }
}

impl WorkoutExporter for ZwoExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Zwo
    }

    fn is_supported(&self, sport: Sport) -> bool {
        is_supported(sport)
    }

    fn render(&self, workout: &Workout) -> Result<String, ExportError> {
        self.generate_zwo(workout)
    }
}
