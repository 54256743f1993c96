// tools.rs - External tool table
// Purpose: Single declared list of the six pipeline tools and their fixed settings.
//          Inventory, installer and stage runner all iterate this table in order.

use std::fmt;

/// GitHub account every tool is released under
pub const RELEASE_OWNER: &str = "projectdiscovery";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Subfinder,
    Dnsx,
    Naabu,
    Httpx,
    Katana,
    Nuclei,
}

/// How stage executables are launched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    Native,
    Docker,
}

impl ExecMode {
    pub fn from_docker_flag(docker: bool) -> Self {
        if docker { ExecMode::Docker } else { ExecMode::Native }
    }
}

/// Extra file a tool writes through its own flag rather than stdout
#[derive(Debug, Clone, Copy)]
pub struct SideFile {
    pub flag: &'static str,
    pub file_name: &'static str,
}

/// Per-tool configuration row
#[derive(Debug)]
pub struct ToolSpec {
    pub tool: Tool,
    pub name: &'static str,
    pub description: &'static str,
    pub flags: &'static [&'static str],
    /// Append `-p <common http ports>` to the flags
    pub http_ports: bool,
    pub side_file: Option<SideFile>,
    /// Warning printed before installing
    pub prerequisite: Option<&'static str>,
}

pub static TOOLS: [ToolSpec; 6] = [
    ToolSpec {
        tool: Tool::Subfinder,
        name: "subfinder",
        description: "Passive subdomain discovery",
        flags: &["-silent"],
        http_ports: false,
        side_file: None,
        prerequisite: None,
    },
    ToolSpec {
        tool: Tool::Dnsx,
        name: "dnsx",
        description: "DNS resolution and validation",
        flags: &["-silent"],
        http_ports: false,
        side_file: None,
        prerequisite: None,
    },
    ToolSpec {
        tool: Tool::Naabu,
        name: "naabu",
        description: "Port scanner (common HTTP ports only)",
        flags: &["-silent"],
        http_ports: true,
        side_file: None,
        prerequisite: Some(
            "To use 'naabu', ensure 'libpcap' is installed: https://github.com/projectdiscovery/naabu#prerequisite",
        ),
    },
    ToolSpec {
        tool: Tool::Httpx,
        name: "httpx",
        description: "HTTP probing with status code, title and tech detection",
        flags: &["-silent", "-nc", "-status-code", "-title", "-tech-detect"],
        http_ports: false,
        side_file: None,
        prerequisite: None,
    },
    ToolSpec {
        tool: Tool::Katana,
        name: "katana",
        description: "Web crawler",
        flags: &["-silent"],
        http_ports: false,
        side_file: None,
        prerequisite: None,
    },
    ToolSpec {
        tool: Tool::Nuclei,
        name: "nuclei",
        description: "Vulnerability scanner",
        flags: &["-silent", "-jsonl"],
        http_ports: false,
        side_file: Some(SideFile {
            flag: "-o",
            file_name: "nuclei.json",
        }),
        prerequisite: None,
    },
];

impl Tool {
    /// Declared order: pipeline order
    pub const ALL: [Tool; 6] = [
        Tool::Subfinder,
        Tool::Dnsx,
        Tool::Naabu,
        Tool::Httpx,
        Tool::Katana,
        Tool::Nuclei,
    ];

    pub fn spec(&self) -> &'static ToolSpec {
        let idx = match self {
            Tool::Subfinder => 0,
            Tool::Dnsx => 1,
            Tool::Naabu => 2,
            Tool::Httpx => 3,
            Tool::Katana => 4,
            Tool::Nuclei => 5,
        };
        &TOOLS[idx]
    }

    pub fn name(&self) -> &'static str {
        self.spec().name
    }

    pub fn from_name(name: &str) -> Option<Tool> {
        TOOLS.iter().find(|spec| spec.name == name).map(|spec| spec.tool)
    }

    /// File name of the installed binary inside the tools directory
    pub fn executable_name(&self) -> String {
        if cfg!(windows) {
            format!("{}.exe", self.name())
        } else {
            self.name().to_string()
        }
    }

    /// Stage output file name (stdout + stderr of the tool)
    pub fn output_file_name(&self) -> String {
        format!("{}.txt", self.name())
    }

    pub fn docker_image(&self, tag: &str) -> String {
        format!("{}/{}:{}", RELEASE_OWNER, self.name(), tag)
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
