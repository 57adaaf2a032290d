use anyhow::Context;
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use sqlx::PgPool;

use registrar_cli::accounts::{NewTeacher, create_teacher};
use registrar_cli::seeder::{self, SeedConfig};

#[derive(Parser)]
#[command(name = "registrar-cli")]
#[command(about = "Registrar CLI - Administrative tools for the Registrar API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a teacher account
    CreateTeacher {
        #[arg(short = 'u', long)]
        username: Option<String>,

        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Prompted with confirmation if not provided
        #[arg(short = 'p', long)]
        password: Option<String>,

        #[arg(short = 'f', long)]
        first_name: Option<String>,

        #[arg(short = 'l', long)]
        last_name: Option<String>,
    },
    /// Seed the database with fake departments, teachers, courses, students and enrollments
    Seed {
        #[arg(short = 'd', long, default_value = "5")]
        departments: usize,

        /// Teachers per department
        #[arg(long, default_value = "4")]
        teachers: usize,

        /// Courses per department
        #[arg(long, default_value = "6")]
        courses: usize,

        #[arg(short = 's', long, default_value = "200")]
        students: usize,

        /// Enrollments per student
        #[arg(long, default_value = "4")]
        enrollments: usize,
    },
    /// Remove all seeded data
    ClearSeed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cli = Cli::parse();
    let pool = registrar_db::init_db_pool().await?;
    registrar_db::run_migrations(&pool).await?;

    match cli.command {
        Commands::CreateTeacher {
            username,
            email,
            password,
            first_name,
            last_name,
        } => handle_create_teacher(&pool, username, email, password, first_name, last_name).await,
        Commands::Seed {
            departments,
            teachers,
            courses,
            students,
            enrollments,
        } => {
            let config = SeedConfig {
                departments,
                teachers_per_department: teachers,
                courses_per_department: courses,
                students,
                enrollments_per_student: enrollments,
            };
            seeder::seed_all(&pool, config)
                .await
                .context("Error seeding database")?;
            Ok(())
        }
        Commands::ClearSeed => {
            seeder::clear_all(&pool)
                .await
                .context("Error clearing seeded data")?;
            Ok(())
        }
    }
}

fn prompt_if_missing(value: Option<String>, prompt: &str) -> anyhow::Result<String> {
    match value {
        Some(value) => Ok(value),
        None => Input::new()
            .with_prompt(prompt)
            .interact_text()
            .with_context(|| format!("Failed to read {}", prompt.to_lowercase())),
    }
}

async fn handle_create_teacher(
    pool: &PgPool,
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
) -> anyhow::Result<()> {
    let username = prompt_if_missing(username, "Username")?;
    let email = prompt_if_missing(email, "Email address")?;
    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .context("Failed to read password")?,
    };

    let teacher = NewTeacher {
        username,
        email,
        password,
        first_name,
        last_name,
    };

    let id = create_teacher(pool, &teacher)
        .await
        .context("Error creating teacher")?;

    println!("\n✅ Teacher created successfully!");
    println!("   ID: {}", id);
    println!("   Username: {}", teacher.username);
    println!("   Email: {}", teacher.email);

    Ok(())
}
