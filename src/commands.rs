//! Transform operations queued on a [`Source`](crate::Source).

use crate::error::{Result, TinifyError};
use crate::formats::ImageType;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMethod {
    /// Scales proportionally to the one given dimension.
    Scale,
    /// Fits inside the given box, keeping the aspect ratio.
    Fit,
    /// Crops to exactly the given box.
    Cover,
    /// Intelligent crop for thumbnails.
    #[serde(rename = "thumb")]
    Thumbnail,
}

impl ResizeMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResizeMethod::Scale => "scale",
            ResizeMethod::Fit => "fit",
            ResizeMethod::Cover => "cover",
            ResizeMethod::Thumbnail => "thumb",
        }
    }

    /// Wire names, in the order they are listed in help text.
    pub fn names() -> Vec<&'static str> {
        vec!["scale", "fit", "cover", "thumb"]
    }
}

impl fmt::Display for ResizeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResizeMethod {
    type Err = TinifyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "scale" => Ok(ResizeMethod::Scale),
            "fit" => Ok(ResizeMethod::Fit),
            "cover" => Ok(ResizeMethod::Cover),
            "thumb" | "thumbnail" => Ok(ResizeMethod::Thumbnail),
            other => Err(TinifyError::validation(format!(
                "invalid resize method: {:?}; expected one of {}",
                other,
                ResizeMethod::names().join(", ")
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResizeOption {
    pub method: ResizeMethod,
    #[serde(skip_serializing_if = "is_zero")]
    pub width: u32,
    #[serde(skip_serializing_if = "is_zero")]
    pub height: u32,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl ResizeOption {
    pub fn new(method: ResizeMethod, width: u32, height: u32) -> Self {
        Self {
            method,
            width,
            height,
        }
    }

    /// Checks the dimension rules for the chosen method.
    pub fn validate(&self) -> Result<()> {
        match self.method {
            ResizeMethod::Scale => {
                if self.width != 0 && self.height != 0 {
                    return Err(TinifyError::validation(
                        "resize with scale method can only have either width or height set, but not both",
                    ));
                }
                if self.width == 0 && self.height == 0 {
                    return Err(TinifyError::validation(
                        "resize with scale method cannot have width and height both set to zero",
                    ));
                }
            }
            ResizeMethod::Fit | ResizeMethod::Cover | ResizeMethod::Thumbnail => {
                if self.width < 1 {
                    return Err(TinifyError::validation("width must be >=1"));
                }
                if self.height < 1 {
                    return Err(TinifyError::validation("height must be >=1"));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertOptions {
    #[serde(rename = "type")]
    pub mime_types: String,
}

impl ConvertOptions {
    /// Maps type names to MIME strings, dropping names that are not recognised.
    ///
    /// # Errors
    /// * `TinifyError::Validation` if `type_names` is empty or none of them map
    pub fn from_type_names<S: AsRef<str>>(type_names: &[S]) -> Result<Self> {
        if type_names.is_empty() {
            return Err(TinifyError::validation(
                "at least one option for convert is required",
            ));
        }

        let mime_types: Vec<&'static str> = type_names
            .iter()
            .filter_map(|name| ImageType::from_name(name.as_ref()))
            .map(|image_type| image_type.mime_type())
            .collect();

        if mime_types.is_empty() {
            return Err(TinifyError::validation(format!(
                "none of the requested types are supported; expected one of {}",
                ImageType::names().join(", ")
            )));
        }

        Ok(Self {
            mime_types: mime_types.join(","),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformOptions {
    /// "white", "black", or a hex colour.
    pub background: String,
}

impl TransformOptions {
    pub fn background(colour: impl Into<String>) -> Self {
        Self {
            background: colour.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CommandName {
    Resize,
    Convert,
    Transform,
}

impl CommandName {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandName::Resize => "resize",
            CommandName::Convert => "convert",
            CommandName::Transform => "transform",
        }
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Resize(ResizeOption),
    Convert(ConvertOptions),
    Transform(TransformOptions),
}

impl Command {
    pub fn name(&self) -> CommandName {
        match self {
            Command::Resize(_) => CommandName::Resize,
            Command::Convert(_) => CommandName::Convert,
            Command::Transform(_) => CommandName::Transform,
        }
    }
}

impl Serialize for Command {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Command::Resize(option) => option.serialize(serializer),
            Command::Convert(options) => options.serialize(serializer),
            Command::Transform(options) => options.serialize(serializer),
        }
    }
}

/// Pending commands, at most one per name.
///
/// Serializes as a JSON object keyed by command name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSet {
    commands: BTreeMap<CommandName, Command>,
}

impl CommandSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `command`, replacing any previous command with the same name.
    pub fn insert(&mut self, command: Command) -> Option<Command> {
        self.commands.insert(command.name(), command)
    }

    pub fn get(&self, name: CommandName) -> Option<&Command> {
        self.commands.get(&name)
    }

    pub fn remove(&mut self, name: CommandName) -> Option<Command> {
        self.commands.remove(&name)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }
}

impl Serialize for CommandSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.commands.len()))?;
        for (name, command) in &self.commands {
            map.serialize_entry(name.as_str(), command)?;
        }
        map.end()
    }
}
