//! # Shell Completion Module
//!
//! This module provides shell completion functionality for Mixtape, including:
//! - Generation of completion scripts for various shells
//! - Custom completion for song names from the catalog
//! - Integration with clap's completion system
//!
//! ## Usage
//!
//! ```bash
//! # Generate bash completions
//! mixtape completion bash > ~/.local/share/bash-completion/completions/mixtape
//!
//! # Song-name aware completions
//! mixtape completion-enhanced fish > ~/.config/fish/completions/mixtape.fish
//! ```

use crate::catalog::{Catalog, CatalogPaths};
use clap::Command;
use clap_complete::{generate, Generator, Shell as CompletionShell};
use log::debug;
use std::io::{self, Write};

const ENHANCED_BASH: &str = r#"#!/bin/bash
# Enhanced Mixtape completion script with song name completion
# Install with: mixtape completion-enhanced bash > ~/.local/share/bash-completion/completions/mixtape

_mixtape_complete_songs() {
    if command -v mixtape >/dev/null 2>&1; then
        mixtape complete-songs 2>/dev/null
    fi
}

_mixtape() {
    local cur prev words cword
    _init_completion || return

    case "${prev}" in
        similar)
            local IFS=$'\n'
            COMPREPLY=($(compgen -W "$(_mixtape_complete_songs)" -- "${cur}"))
            return 0
            ;;
        mood)
            COMPREPLY=($(compgen -W "happy sad energetic relaxed" -- "${cur}"))
            return 0
            ;;
        playlist)
            COMPREPLY=($(compgen -W "workout study chill" -- "${cur}"))
            return 0
            ;;
        completion|completion-enhanced)
            COMPREPLY=($(compgen -W "bash zsh fish power-shell elvish" -- "${cur}"))
            return 0
            ;;
        --data-dir|--save-art)
            _filedir -d
            return 0
            ;;
        --config|--output|-o)
            _filedir
            return 0
            ;;
    esac

    local subcommands="similar mood playlist songs export completion completion-enhanced help"
    local globals="--data-dir --config --no-art --save-art --help"

    if [[ $cword -eq 1 ]]; then
        COMPREPLY=($(compgen -W "$subcommands $globals --version" -- "${cur}"))
    else
        case "${words[1]}" in
            similar)
                COMPREPLY=($(compgen -W "--verbose -v --seed $globals" -- "${cur}"))
                ;;
            export)
                COMPREPLY=($(compgen -W "--output -o $globals" -- "${cur}"))
                ;;
            *)
                COMPREPLY=($(compgen -W "$globals" -- "${cur}"))
                ;;
        esac
    fi
} &&
complete -F _mixtape mixtape

# ex: filetype=sh
"#;

const ENHANCED_FISH: &str = r#"# Enhanced Mixtape completion script for Fish shell with song name completion
# Install with: mixtape completion-enhanced fish > ~/.config/fish/completions/mixtape.fish

function __mixtape_complete_songs
    if command -sq mixtape
        mixtape complete-songs 2>/dev/null
    end
end

# Clear existing completions to avoid conflicts
complete -c mixtape -e

# Global options
complete -c mixtape -s h -l help -d 'Print help information'
complete -c mixtape -s V -l version -d 'Print version information'
complete -c mixtape -l data-dir -r -a '(__fish_complete_directories)' -d 'Catalog directory'
complete -c mixtape -l config -r -d 'TOML configuration file'
complete -c mixtape -l no-art -d 'Do not download album art'
complete -c mixtape -l save-art -r -a '(__fish_complete_directories)' -d 'Save album art here'

# Main commands
complete -c mixtape -f -n '__fish_is_first_token' -a 'similar' -d 'Recommend songs similar to a given song'
complete -c mixtape -f -n '__fish_is_first_token' -a 'mood' -d 'Recommend songs that fit a mood'
complete -c mixtape -f -n '__fish_is_first_token' -a 'playlist' -d 'Build a preset playlist'
complete -c mixtape -f -n '__fish_is_first_token' -a 'songs' -d 'List all song names in the catalog'
complete -c mixtape -f -n '__fish_is_first_token' -a 'export' -d 'Export the joined catalog as CSV'
complete -c mixtape -f -n '__fish_is_first_token' -a 'completion' -d 'Generate shell completions'
complete -c mixtape -f -n '__fish_is_first_token' -a 'completion-enhanced' -d 'Generate enhanced shell completions'

# Arguments
complete -c mixtape -f -n '__fish_seen_subcommand_from similar' -a '(__mixtape_complete_songs)' -d 'Song'
complete -c mixtape -f -n '__fish_seen_subcommand_from similar' -s v -l verbose -d 'Show similarity scores'
complete -c mixtape -f -n '__fish_seen_subcommand_from similar' -l seed -r -d 'Seed for a repeatable draw'
complete -c mixtape -f -n '__fish_seen_subcommand_from mood' -a 'happy sad energetic relaxed'
complete -c mixtape -f -n '__fish_seen_subcommand_from playlist' -a 'workout study chill'
complete -c mixtape -n '__fish_seen_subcommand_from export' -s o -l output -r -d 'Output file'
complete -c mixtape -f -n '__fish_seen_subcommand_from completion' -a 'bash zsh fish power-shell elvish'
complete -c mixtape -f -n '__fish_seen_subcommand_from completion-enhanced' -a 'bash fish'
"#;

/// Generate shell completions for the given shell
pub fn generate_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

/// Enhanced completion script for bash or fish, `None` for other shells.
#[must_use]
pub fn enhanced_completion_script(shell: crate::cli::Shell) -> Option<&'static str> {
    match shell {
        crate::cli::Shell::Bash => Some(ENHANCED_BASH),
        crate::cli::Shell::Fish => Some(ENHANCED_FISH),
        _ => None,
    }
}

/// Convert our Shell enum to clap_complete's Shell enum
#[must_use]
pub fn shell_to_completion_shell(shell: &crate::cli::Shell) -> CompletionShell {
    match shell {
        crate::cli::Shell::Bash => CompletionShell::Bash,
        crate::cli::Shell::Zsh => CompletionShell::Zsh,
        crate::cli::Shell::Fish => CompletionShell::Fish,
        crate::cli::Shell::PowerShell => CompletionShell::PowerShell,
        crate::cli::Shell::Elvish => CompletionShell::Elvish,
    }
}

/// Song names for completion, or nothing if the catalog cannot be loaded.
/// Completion must never print errors into the user's prompt.
#[must_use]
pub fn get_song_completions(paths: &CatalogPaths) -> Vec<String> {
    match Catalog::load(paths) {
        Ok(catalog) => catalog.track_names().into_iter().map(str::to_string).collect(),
        Err(err) => {
            debug!("No song completions: {err}");
            Vec::new()
        }
    }
}

/// Print one song name per line.
///
/// # Errors
///
/// Fails if stdout cannot be written.
pub fn print_song_completions(paths: &CatalogPaths) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for name in get_song_completions(paths) {
        writeln!(out, "{name}")?;
    }
    Ok(())
}
