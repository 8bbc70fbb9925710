use crate::validation::validate_background;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tinify::constants::{DEFAULT_LOG_LEVEL, ENV_API_KEY, ENV_DEBUG, ENV_ENDPOINT, ENV_PROXY};
use tinify::ResizeMethod;

#[derive(Parser)]
#[command(
    name = "tinify",
    about = "Calls the Tinify API from TinyPNG to compress, resize, convert and transform images",
    long_about = "tinify uploads an image (file, standard input or URL) to the Tinify API, \
                  applies the requested operation and writes the result to a file or standard output. \
                  With no INPUT FILE, or when INPUT FILE is -, read from standard input.",
    version,
    after_help = "EXAMPLES:\n  \
    tinify photo.png photo-small.png\n  \
    tinify resize -m fit -w 640 -g 480 photo.jpg thumb.jpg\n  \
    tinify convert -t webp,avif photo.png photo.webp\n  \
    tinify transform --bg white logo.png logo-flat.png\n  \
    cat photo.jpg | tinify compress - - > small.jpg"
)]
pub struct Args {
    #[arg(
        long,
        env = ENV_API_KEY,
        hide_env_values = true,
        global = true,
        help = "Tinify API key",
        long_help = "Tinify API key, as obtained from https://tinypng.com/developers."
    )]
    pub key: Option<String>,

    #[arg(
        long,
        env = ENV_PROXY,
        global = true,
        help = "HTTP(S) proxy used only for the Tinify API"
    )]
    pub proxy: Option<String>,

    #[arg(long, env = ENV_ENDPOINT, global = true, hide = true)]
    pub endpoint: Option<String>,

    #[arg(
        short = 'd',
        long = "debug",
        env = ENV_DEBUG,
        global = true,
        default_value = DEFAULT_LOG_LEVEL,
        value_name = "LEVEL",
        help = "Debug level; \"error\" means no logging"
    )]
    pub debug: String,

    #[command(flatten)]
    pub io: IoArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct IoArgs {
    #[arg(
        short = 'i',
        long = "input",
        value_name = "FILE",
        help = "Input filename or URL (empty or '-' for STDIN)"
    )]
    pub input_flag: Option<String>,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help = "Output filename (empty or '-' for STDOUT)"
    )]
    pub output_flag: Option<String>,

    #[arg(value_name = "INPUT FILE", help = "Input filename or URL (use '-' for STDIN)")]
    pub input: Option<String>,

    #[arg(value_name = "OUTPUT FILE", help = "Output filename (use '-' for STDOUT)")]
    pub output: Option<String>,
}

impl IoArgs {
    /// Input name, `None` for standard input.
    pub fn input(&self) -> Option<&str> {
        stream_name(self.input_flag.as_deref().or(self.input.as_deref()))
    }

    /// Output name, `None` for standard output.
    pub fn output(&self) -> Option<&str> {
        stream_name(self.output_flag.as_deref().or(self.output.as_deref()))
    }
}

fn stream_name(name: Option<&str>) -> Option<&str> {
    name.map(str::trim).filter(|n| !n.is_empty() && *n != "-")
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        visible_alias = "comp",
        about = "Compresses and optimises an image",
        long_about = "Upload any image to the Tinify API to compress it. The type of image \
                      (png, jpeg, webp, avif) is detected automatically and optimised accordingly. \
                      This is the default command."
    )]
    Compress {
        #[command(flatten)]
        io: IoArgs,
    },

    #[command(
        visible_alias = "r",
        about = "Resizes the image to a new size, using one of the possible methods",
        long_about = "Let the API create resized versions of an uploaded image. \
                      Resizing counts as one additional compression. \
                      Available methods are: scale, fit, cover, thumb."
    )]
    Resize {
        #[command(flatten)]
        io: IoArgs,

        #[arg(
            short = 'm',
            long,
            default_value = "scale",
            value_parser = parse_resize_method,
            help = format!("Resizing method [{}]", ResizeMethod::names().join(", "))
        )]
        method: ResizeMethod,

        #[arg(short = 'w', long, default_value_t = 0, help = "Destination image width")]
        width: u32,

        #[arg(short = 'g', long, default_value_t = 0, help = "Destination image height")]
        height: u32,
    },

    #[command(
        visible_alias = "conv",
        about = "Converts from one file type to another (png, jpeg, webp, avif supported)",
        long_about = "Convert images to the desired type. When more than one type is given, \
                      the smallest version is returned. Converting counts as one additional compression."
    )]
    Convert {
        #[command(flatten)]
        io: IoArgs,

        #[arg(
            short = 't',
            long = "type",
            value_name = "TYPES",
            help = "File type(s), comma separated [png, jpeg, webp, avif]",
            long_help = "Comma-separated list of file types. When omitted, the type is guessed \
                         from the output file extension, falling back to webp."
        )]
        types: Option<String>,
    },

    #[command(
        visible_alias = "tr",
        about = "Replaces a transparent background with a solid colour"
    )]
    Transform {
        #[command(flatten)]
        io: IoArgs,

        #[arg(
            long,
            visible_alias = "bg",
            value_parser = parse_background,
            help = "Only \"white\", \"black\", or a hex value are allowed"
        )]
        background: String,
    },

    #[command(visible_alias = "v", about = "Show version and compilation data")]
    Version,
}

fn parse_resize_method(value: &str) -> Result<ResizeMethod, String> {
    value.parse().map_err(|e: tinify::TinifyError| e.to_string())
}

fn parse_background(value: &str) -> Result<String, String> {
    validate_background(value).map_err(|e| e.to_string())
}
