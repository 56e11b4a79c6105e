/// Project configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "distmatrix.toml";

/// Overrides `compiler.program` from the configuration file.
pub const ENV_ESBUILD: &str = "DISTMATRIX_ESBUILD";

/// Class-name pattern handed to wrapper builds running the css-modules plugin.
pub const ENV_CSS_PATTERN: &str = "DISTMATRIX_CSS_PATTERN";

/// Scoping mode handed to wrapper builds running the css-modules plugin.
pub const ENV_CSS_SCOPE: &str = "DISTMATRIX_CSS_SCOPE";

/// Number of hex characters in the `[hash]` class-name token.
pub const HASH_TOKEN_LEN: usize = 8;

pub const DEFAULT_ENTRY: &str = "./src/index.tsx";
pub const DEFAULT_OUT_DIR: &str = "dist";
pub const DEFAULT_BASE_NAME: &str = "react-tooltip";
pub const DEFAULT_EXTERNALS: &[&str] = &["react", "react-dom", "prop-types"];
pub const DEFAULT_STYLE_PATTERN: &str = "react-tooltip__[local]_[hash]";
pub const DEFAULT_COMPILER: &str = "esbuild";
