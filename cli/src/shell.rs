//! The demo grammar: an in-memory key/value store.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use command_dispatch_core::{
    ArgumentType, BooleanArgument, CommandContext, CommandError, Dispatcher, IntArgument, Key,
    StringArgument, UsageStyle, argument, flag, literal,
};
use tracing::debug;

/// Context key granting access to the `admin` command.
pub const ADMIN: Key<bool> = Key::new("admin");

/// Largest value `set` accepts.
pub const MAX_VALUE: i32 = 1000;

#[derive(Debug, Default)]
struct State {
    values: BTreeMap<String, i32>,
    enabled: bool,
    output: Vec<String>,
}

type Shared = Arc<Mutex<State>>;

fn lock(state: &Shared) -> Result<MutexGuard<'_, State>, CommandError> {
    state
        .lock()
        .map_err(|_| CommandError::action("store state is poisoned"))
}

/// A dispatcher wired to a key/value store.
///
/// Commands write their output into a buffer that [`Shell::execute`]
/// returns, so callers decide how to render it.
#[derive(Debug)]
pub struct Shell {
    dispatcher: Dispatcher,
    state: Shared,
}

impl Shell {
    /// Builds the grammar.
    pub fn new(style: UsageStyle) -> Self {
        let state: Shared = Arc::default();
        let mut dispatcher = Dispatcher::new().with_usage_style(style);
        register(&mut dispatcher, &state);
        Self { dispatcher, state }
    }

    /// Executes one line and returns what it printed.
    ///
    /// # Errors
    ///
    /// Returns the parse failure or the command's own failure.
    pub fn execute(&self, line: &str, context: &CommandContext) -> Result<Vec<String>, CommandError> {
        let result = self.dispatcher.execute(line, context);
        let output = std::mem::take(&mut lock(&self.state)?.output);
        debug!(line = %line, ok = result.is_ok(), lines = output.len(), "Executed line");
        result.map(|()| output)
    }

    /// Usage lines beneath a literal path, or `None` if the path is unknown.
    pub fn usage(&self, path: &[&str], context: &CommandContext) -> Option<Vec<String>> {
        self.dispatcher.usage_lines(path, context)
    }
}

fn register(dispatcher: &mut Dispatcher, state: &Shared) {
    let key = StringArgument::word().named("key");
    let value = IntArgument::between(0, MAX_VALUE).named("value");

    let (s, k, v) = (Arc::clone(state), key.clone(), value.clone());
    dispatcher.register(literal("set").then(argument(key.clone()).then(
        argument(value).executes(move |stack| {
            let (key, value) = (stack.argument(&k).clone(), *stack.argument(&v));
            let mut state = lock(&s)?;
            state.values.insert(key.clone(), value);
            state.output.push(format!("{key} = {value}"));
            Ok(())
        }),
    )));

    let (s, k) = (Arc::clone(state), key.clone());
    dispatcher.register(literal("get").then(argument(key.clone()).executes(move |stack| {
        let key = stack.argument(&k);
        let mut state = lock(&s)?;
        let value = *state
            .values
            .get(key)
            .ok_or_else(|| CommandError::action(format!("no value for '{key}'")))?;
        state.output.push(value.to_string());
        Ok(())
    })));

    let (s, k) = (Arc::clone(state), key.clone());
    dispatcher.register_with(
        literal("del").then(argument(key).executes(move |stack| {
            let key = stack.argument(&k);
            let mut state = lock(&s)?;
            if state.values.remove(key).is_none() {
                return Err(CommandError::action(format!("no value for '{key}'")));
            }
            state.output.push(format!("deleted {key}"));
            Ok(())
        })),
        |dispatcher, del| {
            dispatcher.register(literal("rm").redirect(del));
        },
    );

    let s = Arc::clone(state);
    dispatcher.register(
        literal("list")
            .executes(move |stack| {
                let verbose = stack.has_flag('v');
                let mut state = lock(&s)?;
                let lines: Vec<String> = state
                    .values
                    .iter()
                    .map(|(key, value)| {
                        if verbose {
                            format!("{key} = {value}")
                        } else {
                            key.clone()
                        }
                    })
                    .collect();
                state.output.extend(lines);
                Ok(())
            })
            .then(flag('v')),
    );

    let s = Arc::clone(state);
    let text = StringArgument::greedy().named("text");
    let t = text.clone();
    dispatcher.register(literal("echo").then(argument(text).executes(move |stack| {
        lock(&s)?.output.push(stack.argument(&t).clone());
        Ok(())
    })));

    let s = Arc::clone(state);
    let enabled = BooleanArgument::any().named("enabled");
    let e = enabled.clone();
    dispatcher.register(literal("toggle").then(argument(enabled).executes(move |stack| {
        let enabled = *stack.argument(&e);
        let mut state = lock(&s)?;
        state.enabled = enabled;
        state.output.push(format!("enabled: {enabled}"));
        Ok(())
    })));

    let s = Arc::clone(state);
    let message = StringArgument::quoted().named("message");
    let m = message.clone();
    dispatcher.register(literal("say").then(argument(message).executes(move |stack| {
        lock(&s)?.output.push(stack.argument(&m).clone());
        Ok(())
    })));

    let (status, reset) = (Arc::clone(state), Arc::clone(state));
    dispatcher.register(
        literal("admin")
            .requires(|context| context.get(&ADMIN).unwrap_or(false))
            .executes(move |_| {
                let mut state = lock(&status)?;
                let summary = format!(
                    "{} entries, enabled: {}",
                    state.values.len(),
                    state.enabled
                );
                state.output.push(summary);
                Ok(())
            })
            .then(literal("reset").executes(move |_| {
                let mut state = lock(&reset)?;
                let cleared = state.values.len();
                state.values.clear();
                state.output.push(format!("cleared {cleared} entries"));
                Ok(())
            })),
    );
}
