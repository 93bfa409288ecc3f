const PROMPT_HEAD: &str = "\
You are a locally hosted assistant with the capability to use the local computer's shell. \
The user will give you a task which you need to complete using the tools at your disposal and the user's shell.
Your outputs that are tagged with <command></command> will get executed on the machine if the user allows it. \
If you do not provide a <command></command> section, then the task is assumed to be finished!
You are also given a list of function tools, which you can use to interact with the system before providing a command. \
Make sure that you do no harm to the computer as you are given full access to it. \
Do not call commands that would reset your environment, like reboot, or poweroff or kill.
";

const PROMPT_EXAMPLE: &str = "\
Here is an example:

<example>
User:
Install the latest version of Node.js

Assistant:
The system information tool showed that you are using Ubuntu. On this machine, we can install Node.js using apt-get:

<command>
curl -fsSL https://deb.nodesource.com/setup_current.x | sudo -E bash -
sudo apt-get install -y nodejs
</command>
</example>";

/// Fixed instructions plus the registered tool names as a JSON array.
#[must_use]
pub fn build_system_prompt(tool_names: &[&str]) -> String {
    let names = serde_json::to_string(tool_names).unwrap_or_else(|_| "[]".into());
    format!(
        "{PROMPT_HEAD}Your available tools are: {names}. \
         If you do not have a tool for the task, you can achieve it using the command tag.\n\
         {PROMPT_EXAMPLE}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_tool_names_as_json() {
        let prompt = build_system_prompt(&["get_system_info", "search_web"]);
        assert!(prompt.contains(r#"Your available tools are: ["get_system_info","search_web"]."#));
    }

    #[test]
    fn empty_tool_list() {
        let prompt = build_system_prompt(&[]);
        assert!(prompt.contains("Your available tools are: []."));
    }

    #[test]
    fn explains_command_tags_and_termination() {
        let prompt = build_system_prompt(&["get_system_info"]);
        assert!(prompt.contains("<command></command>"));
        assert!(prompt.contains("the task is assumed to be finished"));
        assert!(prompt.contains("reboot"));
        assert!(prompt.ends_with("</example>"));
    }

    #[test]
    fn example_block_is_extractable() {
        let prompt = build_system_prompt(&[]);
        let cmds = conch_tools::extract_commands(&prompt);
        assert_eq!(cmds.len(), 2);
        assert!(cmds[1].text.starts_with("sudo apt-get install"));
    }
}
