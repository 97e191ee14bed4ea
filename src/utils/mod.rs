// Utilities Module
//
// Path and exclusion helpers shared by the scanner and the tree builder.

/// Path conversion utilities (absolute <-> relative Unix-style, module paths)
pub mod paths;

/// Exclusion patterns (built-in defaults, config, .surfaceignore)
pub mod ignore;
