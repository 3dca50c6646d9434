// command.rs
use lazy_static::lazy_static;
use regex::Regex;

pub const LOADMAP_FORMAT: &str =
    "The command provided is invalid. Please use the following format for the 'loadmap' command: 'loadmap filename'";
pub const EDITMAP_FORMAT: &str = "Invalid command. Kindly provide command in format of : editmap filename";
pub const EDITCONTINENT_FORMAT: &str =
    "Invalid command. Kindly provide command in format of : editcontinent -add continentID continentvalue -remove continentID";
pub const EDITCOUNTRY_FORMAT: &str =
    "Invalid command. Kindly provide command in format of : editcountry -add countryID continentID -remove countryID";
pub const EDITNEIGHBOR_FORMAT: &str =
    "Invalid command. Kindly provide command in format of : editneighbor -add countryID neighborcountryID -remove countryID neighborcountryID";
pub const SAVEMAP_FORMAT: &str = "Invalid command. Kindly provide command in format of : savemap filename";
pub const VALIDATEMAP_FORMAT: &str = "Invalid command! validatemap is not supposed to have any arguments";
pub const SHOWMAP_FORMAT: &str = "Invalid command! showmap is not supposed to have any arguments";
pub const GAMEPLAYER_FORMAT: &str =
    "Incorrect command. To add or remove a player, follow this format: gameplayer -add playername [strategy] -remove playername";
pub const ASSIGNCOUNTRIES_FORMAT: &str =
    "Invalid command. To assign countries, follow this format: assigncountries";
pub const TOURNAMENT_FORMAT: &str =
    "Invalid command. Kindly provide command in format of : tournament -M listofmapfiles -P listofplayerstrategies -G numberofgames -D maxnumberofturns";
pub const SAVEGAME_FORMAT: &str = "Invalid command. Kindly provide command in format of : savegame filename";
pub const LOADGAME_FORMAT: &str = "Invalid command. Kindly provide command in format of : loadgame filename";

pub const DEPLOY_FORMAT: &str = "Invalid command. Kindly provide command in format of : deploy countryID numarmies";
pub const ADVANCE_FORMAT: &str =
    "Invalid command. Kindly provide command in format of : advance countrynamefrom countynameto numberofarmies";
pub const BOMB_FORMAT: &str = "Invalid command. Kindly provide command in format of : bomb countryID";
pub const BLOCKADE_FORMAT: &str = "Invalid command. Kindly provide command in format of : blockade countryID";
pub const AIRLIFT_FORMAT: &str =
    "Invalid command. Kindly provide command in format of : airlift sourcecountryID targetcountryID numarmies";
pub const NEGOTIATE_FORMAT: &str = "Invalid command. Kindly provide command in format of : negotiate playerID";

pub const MAP_NOT_LOADED: &str = "Map not found. To proceed, please load a valid map.";
pub const MAP_NOT_EDITED: &str = "No map is being edited. Start with: editmap filename";
pub const VALID_MAP: &str = "The loaded map is valid!";
pub const INVALID_IN_PHASE: &str = "Invalid Command in Current State";
pub const NOT_ENOUGH_PLAYERS: &str = "At least two players are needed to assign countries";

pub const STARTUP_COMMANDS: [&str; 13] = [
    "loadmap",
    "editmap",
    "editcontinent",
    "editcountry",
    "editneighbor",
    "validatemap",
    "savemap",
    "showmap",
    "gameplayer",
    "assigncountries",
    "tournament",
    "savegame",
    "loadgame",
];

lazy_static! {
    // `-name arg arg ...`; arguments run until the next dash-prefixed token.
    static ref OPERATION: Regex =
        Regex::new(r"(?:^|\s)-([A-Za-z]+)((?:\s+[^\s-]\S*)*)").expect("operation pattern is valid");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub name: String,
    pub args: Vec<String>,
}

/// A startup command: `root [args...] [-op args...]*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub root: String,
    pub args: Vec<String>,
    pub operations: Vec<Operation>,
}

impl Command {
    pub fn parse(line: &str) -> Option<Command> {
        let line = line.trim();
        let mut parts = line.splitn(2, char::is_whitespace);
        let root = parts.next()?.to_ascii_lowercase();
        if root.is_empty() {
            return None;
        }
        let rest = parts.next().unwrap_or("").trim();

        let first_operation = OPERATION.find(rest).map_or(rest.len(), |m| m.start());
        let args = rest[..first_operation]
            .split_whitespace()
            .map(String::from)
            .collect();
        let operations = OPERATION
            .captures_iter(rest)
            .map(|caps| Operation {
                name: caps[1].to_ascii_lowercase(),
                args: caps[2].split_whitespace().map(String::from).collect(),
            })
            .collect();

        Some(Command {
            root,
            args,
            operations,
        })
    }

    pub fn is_startup_command(root: &str) -> bool {
        STARTUP_COMMANDS.contains(&root)
    }

    pub fn has_no_arguments(&self) -> bool {
        self.args.is_empty() && self.operations.is_empty()
    }

    /// The single positional argument, when that is all the command carries.
    pub fn single_argument(&self) -> Option<&str> {
        match (self.args.as_slice(), self.operations.is_empty()) {
            ([only], true) => Some(only.as_str()),
            _ => None,
        }
    }

    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations.iter().find(|op| op.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_argument() {
        let command = Command::parse("loadmap  europe.json ").unwrap();
        assert_eq!(command.root, "loadmap");
        assert_eq!(command.single_argument(), Some("europe.json"));
    }

    #[test]
    fn multiple_operations_keep_their_arguments() {
        let command = Command::parse("editcontinent -add Asia 7 -remove Europe -add Africa 3").unwrap();
        assert!(command.args.is_empty());
        assert_eq!(command.operations.len(), 3);
        assert_eq!(command.operations[0].args, vec!["Asia", "7"]);
        assert_eq!(command.operations[1].name, "remove");
        assert_eq!(command.operations[2].args, vec!["Africa", "3"]);
    }

    #[test]
    fn hyphenated_names_are_not_operations() {
        let command = Command::parse("editcountry -add North-Africa Africa").unwrap();
        assert_eq!(command.operations.len(), 1);
        assert_eq!(command.operations[0].args, vec!["North-Africa", "Africa"]);
    }

    #[test]
    fn tournament_flags_are_case_insensitive() {
        let command = Command::parse("tournament -M a.json b.json -P Aggressive Random -G 2 -D 20").unwrap();
        assert_eq!(command.operation("m").unwrap().args.len(), 2);
        assert_eq!(command.operation("P").unwrap().args, vec!["Aggressive", "Random"]);
        assert_eq!(command.operation("g").unwrap().args, vec!["2"]);
    }

    #[test]
    fn empty_line_is_not_a_command() {
        assert!(Command::parse("   ").is_none());
        assert!(Command::parse("validatemap").unwrap().has_no_arguments());
    }
}
