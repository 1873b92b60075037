//! Rendering of the IPMI help block.
//!
//! Pure function of `host`, `port` and `site`: no clock, no randomness,
//! so identical inputs always give identical markup.

use std::fmt;

use crate::models::PageLocation;

/// Demo credentials shown in every example command.
pub const DEMO_USER: &str = "admin";
pub const DEMO_PASSWD: &str = "admin";

/// Values substituted into the template for one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    pub host: String,
    pub port: u16,
    pub site: String,
}

impl RenderContext {
    pub fn new(location: &PageLocation, port: u16) -> Self {
        Self {
            host: location.hostname.clone(),
            port,
            site: location.origin(),
        }
    }
}

struct PowerExample {
    comment: &'static str,
    ipmi_action: &'static str,
    atx_path: &'static str,
    post: bool,
}

const EXAMPLES: [PowerExample; 5] = [
    PowerExample {
        comment: "Power on the server if it's off:",
        ipmi_action: "on",
        atx_path: "/api/atx/power?action=on",
        post: true,
    },
    PowerExample {
        comment: "Soft power off the server if it's on:",
        ipmi_action: "soft",
        atx_path: "/api/atx/power?action=off",
        post: true,
    },
    PowerExample {
        comment: "Hard power off the server if it's on:",
        ipmi_action: "off",
        atx_path: "/api/atx/power?action=off_hard",
        post: true,
    },
    PowerExample {
        comment: "Hard reset the server if it's on:",
        ipmi_action: "reset",
        atx_path: "/api/atx/power?action=reset_hard",
        post: true,
    },
    PowerExample {
        comment: "Check the power status:",
        ipmi_action: "status",
        atx_path: "/api/atx",
        post: false,
    },
];

/// Builds the markup assigned to the `ipmi-text` element.
pub fn render_ipmi_help(ctx: &RenderContext) -> String {
    IpmiHelp(ctx).to_string()
}

/// The help block as a `Display` value: the five pairs separated by a blank `<br>` line.
struct IpmiHelp<'a>(&'a RenderContext);

impl fmt::Display for IpmiHelp<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, example) in EXAMPLES.iter().enumerate() {
            if index > 0 {
                f.write_str("<br>\n<br>\n")?;
            }
            write_example(f, self.0, example)?;
        }
        Ok(())
    }
}

fn write_example(f: &mut fmt::Formatter<'_>, ctx: &RenderContext, ex: &PowerExample) -> fmt::Result {
    write!(
        f,
        concat!(
            r#"<span class="code-comment"># {comment}<br>"#, "\n",
            r#"$</span> ipmitool -I lanplus -U {user} -P {passwd} -H {host} -p {port} power {action}<br>"#, "\n",
            r#"<span class="code-comment">$</span> curl {method}-HX-KVMD-User:{user} -HX-KVMD-Passwd:{passwd} -k \<br>"#, "\n",
            "&nbsp;&nbsp;&nbsp;&nbsp;{site}{path}",
        ),
        comment = ex.comment,
        user = DEMO_USER,
        passwd = DEMO_PASSWD,
        host = ctx.host,
        port = ctx.port,
        action = ex.ipmi_action,
        method = if ex.post { "-XPOST " } else { "" },
        site = ctx.site,
        path = ex.atx_path,
    )
}
