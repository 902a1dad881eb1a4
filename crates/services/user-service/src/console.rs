//! Interactive console front end.
//!
//! Reads menu choices and field values line by line, calls the
//! [`UserService`] and prints the outcome. A failed operation is reported and
//! the loop goes on; only I/O errors on the console itself end it.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use common::AppError;
use domain::{UpdateUser, User};

use crate::service::UserService;

/// Menu-driven console over a user service.
pub struct Console<R, W> {
    service: Arc<dyn UserService>,
    input: R,
    output: W,
    json: bool,
}

/// Result of parsing an optional numeric answer
enum Answer<T> {
    Value(T),
    Empty,
    Invalid,
}

impl<R: BufRead, W: Write> Console<R, W> {
    /// Create a console reading from `input` and writing to `output`.
    pub fn new(service: Arc<dyn UserService>, input: R, output: W) -> Self {
        Self {
            service,
            input,
            output,
            json: false,
        }
    }

    /// Print users as JSON instead of the display form.
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Give back the output sink.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Run the menu loop until the user exits or input ends.
    pub async fn run(&mut self) -> io::Result<()> {
        loop {
            self.display_menu()?;
            let Some(choice) = self.prompt("\nEnter your choice: ")? else {
                break;
            };

            match choice.trim() {
                "1" => self.create_user().await?,
                "2" => self.get_user().await?,
                "3" => self.list_users().await?,
                "4" => self.update_user().await?,
                "5" => self.delete_user().await?,
                "6" => break,
                _ => writeln!(self.output, "Invalid choice. Please try again.")?,
            }
        }

        writeln!(self.output, "Goodbye.")?;
        self.output.flush()
    }

    fn display_menu(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n=== User Service ===")?;
        writeln!(self.output, "1. Create User")?;
        writeln!(self.output, "2. Get User by ID")?;
        writeln!(self.output, "3. Get All Users")?;
        writeln!(self.output, "4. Update User")?;
        writeln!(self.output, "5. Delete User")?;
        writeln!(self.output, "6. Exit")
    }

    async fn create_user(&mut self) -> io::Result<()> {
        let Some(name) = self.prompt("Enter name: ")? else {
            return Ok(());
        };
        let Some(email) = self.prompt("Enter email: ")? else {
            return Ok(());
        };
        let age = match self.prompt_number::<i32>("Enter age: ")? {
            Answer::Value(age) => Some(age),
            Answer::Empty => None,
            Answer::Invalid => {
                return writeln!(self.output, "Invalid age format. Please enter a number.");
            }
        };

        match self.service.create_user(name, email, age).await {
            Ok(user) => self.print_user("User created successfully: ", &user),
            Err(e) => self.report("creating user", &e),
        }
    }

    async fn get_user(&mut self) -> io::Result<()> {
        let Some(id) = self.prompt_id("Enter user ID: ")? else {
            return Ok(());
        };

        match self.service.get_user(id).await {
            Ok(Some(user)) => self.print_user("User found: ", &user),
            Ok(None) => writeln!(self.output, "User not found with ID: {}", id),
            Err(e) => self.report("finding user", &e),
        }
    }

    async fn list_users(&mut self) -> io::Result<()> {
        match self.service.list_users().await {
            Ok(users) if users.is_empty() => writeln!(self.output, "No users found."),
            Ok(users) => {
                writeln!(self.output, "Users:")?;
                for user in &users {
                    self.print_user("", user)?;
                }
                Ok(())
            }
            Err(e) => self.report("retrieving users", &e),
        }
    }

    async fn update_user(&mut self) -> io::Result<()> {
        let Some(id) = self.prompt_id("Enter user ID to update: ")? else {
            return Ok(());
        };

        let current = match self.service.get_user(id).await {
            Ok(Some(user)) => user,
            Ok(None) => return writeln!(self.output, "User not found with ID: {}", id),
            Err(e) => return self.report("updating user", &e),
        };

        let name = self.prompt(&format!("Enter new name (current: {}): ", current.name()))?;
        let email = self.prompt(&format!("Enter new email (current: {}): ", current.email()))?;
        let age_prompt = match current.age() {
            Some(age) => format!("Enter new age (current: {}): ", age),
            None => "Enter new age (current: unknown): ".to_string(),
        };
        let age = match self.prompt_number::<i32>(&age_prompt)? {
            Answer::Value(age) => Some(age),
            Answer::Empty => None,
            Answer::Invalid => {
                return writeln!(self.output, "Invalid age format. Please enter a number.");
            }
        };

        let changes = UpdateUser {
            name: name.filter(|s| !s.is_empty()),
            email: email.filter(|s| !s.is_empty()),
            age,
        };
        if changes.is_empty() {
            return writeln!(self.output, "Nothing to update.");
        }

        match self.service.update_user(id, changes).await {
            Ok(user) => self.print_user("User updated successfully: ", &user),
            Err(e) => self.report("updating user", &e),
        }
    }

    async fn delete_user(&mut self) -> io::Result<()> {
        let Some(id) = self.prompt_id("Enter user ID to delete: ")? else {
            return Ok(());
        };

        match self.service.delete_user(id).await {
            Ok(()) => writeln!(self.output, "User deleted successfully."),
            Err(e) => self.report("deleting user", &e),
        }
    }

    /// Print `message` and read one line without its line ending.
    /// `None` means input is exhausted.
    fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", message)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn prompt_number<T: std::str::FromStr>(&mut self, message: &str) -> io::Result<Answer<T>> {
        let answer = match self.prompt(message)? {
            Some(line) => line,
            None => return Ok(Answer::Empty),
        };
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(Answer::Empty);
        }
        Ok(answer.parse().map_or(Answer::Invalid, Answer::Value))
    }

    fn prompt_id(&mut self, message: &str) -> io::Result<Option<i64>> {
        match self.prompt_number::<i64>(message)? {
            Answer::Value(id) => Ok(Some(id)),
            Answer::Empty | Answer::Invalid => {
                writeln!(self.output, "Invalid ID format. Please enter a number.")?;
                Ok(None)
            }
        }
    }

    fn print_user(&mut self, prefix: &str, user: &User) -> io::Result<()> {
        if self.json {
            let json = serde_json::to_string(user)?;
            writeln!(self.output, "{}{}", prefix, json)
        } else {
            writeln!(self.output, "{}{}", prefix, user)
        }
    }

    fn report(&mut self, action: &str, err: &AppError) -> io::Result<()> {
        tracing::warn!(code = err.code(), "Error {}: {}", action, err);
        writeln!(self.output, "Error {}: {}", action, err.user_message())
    }
}
