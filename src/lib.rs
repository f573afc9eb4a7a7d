//! A pure Rust compiler that turns a CAD assembly description into the
//! model-creation script consumed by the Patran meshing and solver front end.
//! It resolves cross-references between the assembly, its metrics and the
//! computed values, builds densely numbered entity tables, and renders them
//! through a template registry into a single text script.
//!
//! # Features
//!
//! - **Reference resolution**: Points, faces, loads and constraints are
//!   linked across three XML documents by metric and component IDs
//! - **Dense numbering**: Every entity table is numbered `1..=N` in
//!   first-seen order, the numbering the downstream batch tool expects
//! - **Material resolution**: Case-insensitive lookup in a JSON material
//!   library with elastic modulus conversion to MPa, memoized per run
//! - **Template rendering**: TOML block templates with `$Name` placeholders,
//!   unset-value line suppression and a script-wide substitution pass
//! - **Strict validation**: Structural problems abort the run before any
//!   output is written; data-quality problems are kept as diagnostics
//!
//! # Quick Start
//!
//! The main entry point is [`compile`], which takes the parsed [`io::Documents`],
//! a [`MaterialLibrary`] and a [`CompileConfig`] and produces a
//! [`CompiledScript`]:
//!
//! ```
//! use patran_forge::io::Documents;
//! use patran_forge::{CompileConfig, MaterialLibrary, compile};
//!
//! let assembly = r#"
//!   <Assemblies>
//!     <Assembly ConfigurationID="cfg-1">
//!       <CADComponent ComponentID="top" Type="ASSEMBLY" Name="Bracket">
//!         <CADComponent ComponentID="plate" Type="PART" Name="PLATE"/>
//!       </CADComponent>
//!       <Analyses>
//!         <Static><Metrics>
//!           <Metric MetricID="m1" MetricType="POINTCOORDINATES"/>
//!         </Metrics></Static>
//!         <FEA Type="STRUCTURAL" MeshOnly="false">
//!           <Solvers><Solver Type="PATRAN_NASTRAN" ShellElementType="PLATE_4_NODE"/></Solvers>
//!           <Loads>
//!             <Load _id="load-1">
//!               <Pressure Value="5.0" Units="MPa"/>
//!               <Geometry>
//!                 <Features GeometryType="FACE" FeatureGeometryType="POINT">
//!                   <Feature MetricID="m1"/>
//!                 </Features>
//!               </Geometry>
//!             </Load>
//!           </Loads>
//!         </FEA>
//!       </Analyses>
//!     </Assembly>
//!   </Assemblies>"#;
//!
//! let metrics = r#"
//!   <CADAssemblyMetrics>
//!     <MetricComponents>
//!       <MetricComponent MetricID="7" Type="PART"><Material Type="Aluminum 6061"/></MetricComponent>
//!     </MetricComponents>
//!     <Assemblies><CADComponent MetricID="7" ComponentInstanceID="plate"/></Assemblies>
//!   </CADAssemblyMetrics>"#;
//!
//! let computed = r#"
//!   <ComputedValues><Component><Metrics>
//!     <Metric MetricID="m1" Type="VECTOR" Units="mm" ArrayValue="0.0;10.0;2.5"/>
//!   </Metrics></Component></ComputedValues>"#;
//!
//! let library = MaterialLibrary::from_json(r#"{"Material library": {"aluminum 6061": {
//!     "mechanical__modulus_elastic": {"value": 68900000000.0, "unit": "Pa"},
//!     "mechanical__ratio_poissons": {"value": 0.33},
//!     "density": {"value": 2700.0},
//!     "thermal__coefficient_expansion_linear": {"value": 2.36e-05}
//! }}}"#)?;
//!
//! let docs = Documents::parse(assembly, metrics, computed)?;
//! let script = compile(&docs, &library, &CompileConfig::default())?;
//!
//! // One solid, one material, one pressure load and its value, each ID 1.
//! assert_eq!(script.model.solids.len(), 1);
//! assert_eq!(script.model.loads.len(), 1);
//! assert!(script.text.contains("Elastic_Modulus = 68900.0"));
//! assert!(script.text.contains("Type = PRESSURE"));
//! assert!(script.text.contains("Geometry_File = Bracket_asm.x_t"));
//! assert!(script.warnings().all(|w| !w.message.contains("not found")));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Module Organization
//!
//! - [`io`]: Input documents, the material library file, script output and
//!   the failure sentinel
//! - [`compile`] and [`compile_files`]: The compiler pipeline
//! - [`CompileConfig`]: Templates, placeholder policy and run settings
//!
//! # Data Types
//!
//! - [`CompiledModel`]: Every entity table of one run
//! - [`Table`] and [`Id`]: Insertion-ordered tables with dense IDs
//! - [`Point`], [`Geometry`], [`Surface`], [`Solid`], [`Material`],
//!   [`Layup`], [`Layer`], [`SurfaceContents`], [`PinSpecifier`],
//!   [`DisplacementSpecifier`], [`Constraint`], [`Load`],
//!   [`ScalarLoadValue`], [`MeshParameters`], [`Analysis`]: Entity records
//! - [`Diagnostic`] and [`Severity`]: Non-fatal problems found while compiling

mod compile;
mod model;

pub mod io;

pub use model::compiled::{CompiledModel, TableCount};
pub use model::entity::{
    Analysis, AxisGroup, Constraint, ConstraintKind, DisplacementSpecifier, Geometry,
    GeometryKind, Layer, Layup, Load, Material, MaterialProperties, MeshParameters, PinSpecifier,
    Point, PropertyValue, ScalarLoadValue, Solid, Surface, SurfaceContents,
};
pub use model::table::{Id, Table};
pub use model::types::{
    Axis, AxisSetting, Instructions, LoadKind, Motion, ParseAxisSettingError, ParseLoadKindError,
};

pub use compile::{
    CompileConfig, CompiledScript, DEFAULT_TEST_BENCH_NAME, Diagnostic, Extraction, Globals,
    MaterialEntry, MaterialLibrary, NO_VALUE, PlaceholderMode, Quantity, Severity,
    TemplateRegistry, TemplateSection, UNASSIGNED_MATERIAL, compile, compile_files,
    default_templates, extract_model, load_templates, render_script,
};

pub use compile::Error as CompileError;

/// Exit status of a run that failed inside the compiler.
pub const COMPILE_FAILURE_EXIT_CODE: u8 = 99;
