pub mod curl;
pub mod dispatcher;
pub mod error;
pub mod registry;
pub mod system_tools;
pub mod types;

pub use curl::{parse_curl_command, ParsedCurl};
pub use dispatcher::{DispatchOutcome, ToolDispatcher};
pub use error::ToolError;
pub use registry::{NewTool, ToolRegistry};
pub use system_tools::{seeded_system_tools, AppModule, SystemAction};
pub use types::{
    function_schema, EndpointSpec, HttpMethod, ParameterSchema, ResolvedTool, SystemBehavior,
    SystemTool, ToolsDocument, UserTool,
};
