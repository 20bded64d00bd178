use anyhow::{Context, anyhow};
use course_core::gate::{GateAction, GateState, Route};
use course_core::model::{
    AssignmentDraft, Course, CourseFilters, Enrollment, EnrollmentAnalytics, LessonMaterials,
    RegistrationDraft, SubmissionDraft, SubmissionStatus,
};
use course_core::tracker::{LessonState, MaterialAccess};
use services::{AppServices, AuthState, Classroom, LessonView};

use crate::Command;
use crate::drafts::{self, CourseFile, QuizFile};

pub(crate) async fn execute(services: &AppServices, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login {
            email,
            password,
            next,
        } => {
            let login = match next {
                Some(raw) => Route::login_redirect(&Route::parse(&raw)?),
                None => Route::parse(course_core::gate::LOGIN_PATH)?,
            };
            let user = services.session().login(&email, &password).await?;
            println!("Signed in as {} ({})", user.name, user.role);
            println!("Continue at {}", Route::post_login_target(&login, user.role));
        }
        Command::Register {
            name,
            email,
            password,
            role,
        } => {
            let user = services
                .session()
                .register(RegistrationDraft {
                    name,
                    email,
                    password,
                    role,
                })
                .await?;
            println!("Welcome, {}. Your account is ready.", user.name);
            println!("Continue at {}", Route::landing(user.role));
        }
        Command::Logout => {
            services.session().logout().await?;
            println!("Signed out");
        }
        Command::Whoami => match services.session().state() {
            AuthState::SignedIn(session) => println!(
                "{} <{}> {} (checked {})",
                session.user.name,
                session.user.email,
                session.user.role,
                session.checked_at.format("%Y-%m-%d %H:%M")
            ),
            AuthState::Checking | AuthState::SignedOut => println!("Not signed in"),
        },
        Command::Courses {
            search,
            category,
            tags,
            sort,
            page,
            limit,
        } => {
            let filters = CourseFilters {
                search,
                category,
                tags,
                sort,
                page,
                limit,
            };
            let page = services.courses().list(&filters).await?;
            if page.items.is_empty() {
                println!("No courses found");
            }
            for course in &page.items {
                println!(
                    "{:<26} {:<40} {:>8.2}  {}",
                    course.id(),
                    course.title(),
                    course.price(),
                    course.category()
                );
            }
            println!(
                "page {}/{} ({} courses)",
                page.meta.page, page.meta.total_pages, page.meta.total
            );
        }
        Command::Course { id } => {
            let course = services.courses().get(&id).await?;
            print_course(&course);
        }
        Command::Enroll { course, batch } => {
            let enrollment = services.learning().enroll(&course, &batch).await?;
            println!("Enrolled in {} (batch {})", enrollment.course_id(), enrollment.batch_id);
        }
        Command::Enrolled => {
            let enrollments = services.learning().enrolled_courses().await?;
            if enrollments.is_empty() {
                println!("No enrollments yet");
            }
            for enrollment in &enrollments {
                print_enrollment(enrollment);
            }
        }
        Command::Learn { course, lesson } => {
            let classroom = services
                .learning()
                .classroom(&course, lesson.as_ref())
                .await?
                .ok_or_else(|| anyhow!("classroom request was superseded"))?;
            print_classroom(&classroom);
        }
        Command::Complete { course, lesson } => {
            let progress = services
                .learning()
                .mark_lesson_complete(&course, &lesson)
                .await?;
            println!(
                "{} of {} lessons done ({}%)",
                progress.lessons_completed(),
                progress.total_lessons(),
                progress.percentage()
            );
        }
        Command::Materials { course, lesson } => {
            let view = lesson_view(services, &course, &lesson).await?;
            print_lesson_view(&view);
        }
        Command::Submit {
            assignment,
            text,
            link,
        } => {
            let stored = services
                .learning()
                .submit_assignment(SubmissionDraft {
                    assignment_id: assignment,
                    text,
                    link,
                })
                .await?;
            println!(
                "Submitted at {}",
                stored.submitted_at.format("%Y-%m-%d %H:%M")
            );
        }
        Command::Quiz {
            course,
            lesson,
            quiz,
            answers,
            seconds,
        } => {
            let view = lesson_view(services, &course, &lesson).await?;
            let materials = view
                .visible_materials()
                .context("complete the lesson before taking its quiz")?;
            let quiz = materials
                .quizzes
                .iter()
                .find(|q| q.id == quiz)
                .ok_or_else(|| anyhow!("lesson {lesson} has no quiz {quiz}"))?;
            let answers = parse_answers(&answers)?;
            let result = services
                .learning()
                .submit_quiz(quiz, answers, seconds)
                .await?;
            let score = result
                .attempt
                .score
                .map_or_else(|| "pending".to_owned(), |s| format!("{s}%"));
            let verdict = if result.passed { "passed" } else { "not passed" };
            println!(
                "Score {score}, {verdict} (needs {}%)",
                result.passing_score
            );
        }
        Command::Open { path } => {
            let route = Route::parse(&path)?;
            let outcome = services.session().guard(&route);
            match (outcome.state, outcome.action) {
                (_, GateAction::Render) => println!("{route}: allowed"),
                (_, GateAction::ShowLoading) => println!("{route}: still checking session"),
                (GateState::Unauthenticated, GateAction::RedirectTo(to)) => {
                    println!("{route}: sign in first, redirecting to {to}");
                }
                (_, GateAction::RedirectTo(to)) => {
                    println!("{route}: not for your role, redirecting to {to}");
                }
            }
        }
        Command::Stats => {
            let stats = services.admin().dashboard_stats().await?;
            println!("courses      {}", stats.total_courses);
            println!("students     {}", stats.total_students);
            println!("enrollments  {}", stats.total_enrollments);
            println!("assignments  {}", stats.total_assignments);
        }
        Command::Enrollments => {
            for enrollment in services.admin().enrollments().await? {
                print_enrollment(&enrollment);
            }
        }
        Command::Submissions => {
            for record in services.admin().submissions().await? {
                let status = match record.status() {
                    SubmissionStatus::Graded { score, max } => format!("{score}/{max}"),
                    SubmissionStatus::PendingReview => "pending".to_owned(),
                    SubmissionStatus::NotSubmitted => "missing".to_owned(),
                };
                println!(
                    "{:<20} {:<30} {:<20} {}",
                    record.assignment_id,
                    record.assignment_title,
                    record.submission.student_id,
                    status
                );
            }
        }
        Command::Grade {
            assignment,
            student,
            score,
            feedback,
        } => {
            let admin = services.admin();
            let record = admin
                .submissions()
                .await?
                .into_iter()
                .find(|r| r.assignment_id == assignment && r.submission.student_id == student)
                .ok_or_else(|| anyhow!("no submission from {student} for {assignment}"))?;
            let graded = admin.grade(&record, score, feedback).await?;
            println!(
                "Graded {}: {}/{}",
                student,
                graded.grade.unwrap_or(score),
                record.max_score
            );
        }
        Command::Analytics => {
            let analytics = services.admin().enrollment_analytics().await?;
            print_analytics(&analytics);
        }
        Command::CourseCreate { file } => {
            let draft = drafts::read_json::<CourseFile>(&file)?.into_draft()?;
            let course = services.courses().create(draft).await?;
            println!("Created course {} [{}]", course.title(), course.id());
        }
        Command::CourseEdit { id, file } => {
            let draft = drafts::read_json::<CourseFile>(&file)?.into_draft()?;
            let course = services.courses().update(&id, draft).await?;
            println!("Updated course {} [{}]", course.title(), course.id());
        }
        Command::CourseDelete { id } => {
            services.courses().delete(&id).await?;
            println!("Deleted course {id}");
        }
        Command::LessonMaterials { course, lesson } => {
            let materials = services.admin().lesson_materials(&course, &lesson).await?;
            if materials.is_empty() {
                println!("No materials for lesson {lesson}");
            }
            print_materials(&materials);
        }
        Command::AssignmentCreate {
            course,
            lesson,
            title,
            description,
            due,
            max_score,
        } => {
            let assignment = services
                .admin()
                .create_assignment(AssignmentDraft {
                    course_id: course,
                    lesson_id: lesson,
                    title,
                    description,
                    due_date: due,
                    max_score,
                })
                .await?;
            println!("Created assignment {} ({})", assignment.title, assignment.id);
        }
        Command::QuizCreate {
            course,
            lesson,
            file,
        } => {
            let draft = drafts::read_json::<QuizFile>(&file)?.into_draft(course, lesson);
            let quiz = services.admin().create_quiz(draft).await?;
            println!(
                "Created quiz {} ({}, {} questions)",
                quiz.title,
                quiz.id,
                quiz.questions.len()
            );
        }
    }
    Ok(())
}

async fn lesson_view(
    services: &AppServices,
    course: &course_core::model::CourseId,
    lesson: &course_core::model::LessonId,
) -> anyhow::Result<LessonView> {
    let learning = services.learning();
    let classroom = learning
        .classroom(course, Some(lesson))
        .await?
        .ok_or_else(|| anyhow!("classroom request was superseded"))?;
    learning
        .lesson_materials(&classroom, lesson)
        .await?
        .ok_or_else(|| anyhow!("materials request was superseded"))
}

/// `-` skips a question; anything else is a zero-based option index.
fn parse_answers(raw: &[String]) -> anyhow::Result<Vec<Option<usize>>> {
    raw.iter()
        .map(|answer| match answer.trim() {
            "-" => Ok(None),
            value => value
                .parse::<usize>()
                .map(Some)
                .with_context(|| format!("answer {value:?} is not an option number")),
        })
        .collect()
}

fn print_course(course: &Course) {
    println!("{} [{}]", course.title(), course.id());
    if let Some(instructor) = course.instructor() {
        println!("by {instructor}");
    }
    println!("{}", course.description());
    println!(
        "{} | {:.2} | {} lessons, {} min",
        course.category(),
        course.price(),
        course.total_lessons(),
        course.total_minutes()
    );
    if !course.tags().is_empty() {
        let tags: Vec<&str> = course.tags().iter().map(String::as_str).collect();
        println!("tags: {}", tags.join(", "));
    }
    println!();
    for (index, lesson) in course.syllabus().iter().enumerate() {
        println!(
            "{:>3}. {} ({} min)",
            index + 1,
            lesson.title(),
            lesson.duration_minutes()
        );
    }
    println!();
    for batch in course.batches() {
        let seats = match batch.seats_left() {
            Some(0) => "full".to_owned(),
            Some(left) => format!("{left} seats left"),
            None => format!("{} seats", batch.capacity()),
        };
        println!(
            "batch {}: {} to {}, {seats}",
            batch.id(),
            batch.start_date().format("%Y-%m-%d"),
            batch.end_date().format("%Y-%m-%d")
        );
    }
}

fn print_enrollment(enrollment: &Enrollment) {
    let title = enrollment
        .course
        .course()
        .map_or_else(|| enrollment.course_id().to_string(), |c| c.title().to_owned());
    println!(
        "{:<40} batch {:<12} {:>3}%  {:?}",
        title,
        enrollment.batch_id,
        enrollment.percentage(),
        enrollment.status
    );
}

fn print_classroom(classroom: &Classroom) {
    let summary = classroom.summary();
    println!("{}", classroom.course.title());
    println!(
        "{}/{} lessons, {}% done, {} of {} min left",
        summary.lessons_completed,
        summary.total_lessons,
        summary.percentage,
        summary.remaining_minutes,
        summary.total_minutes
    );
    for row in classroom.overview() {
        let marker = match row.state {
            LessonState::Completed => "[x]",
            LessonState::Current => "[>]",
            LessonState::Pending => "[ ]",
        };
        println!(
            "{marker} {:>3}. {} ({} min)",
            row.number, row.title, row.duration_minutes
        );
    }
    if let Some(lesson) = classroom.current_lesson() {
        println!();
        println!("Now: {}", lesson.title());
        if let Some(url) = lesson.video_url() {
            println!("video: {url}");
        }
        if let Some(description) = lesson.description() {
            println!("{description}");
        }
    }
    if let Some(prev) = classroom.previous_lesson() {
        println!("previous: {} ({})", prev.title(), prev.id());
    }
    if let Some(next) = classroom.next_lesson() {
        println!("next: {} ({})", next.title(), next.id());
    }
}

fn print_lesson_view(view: &LessonView) {
    match view.access {
        MaterialAccess::Locked { pending } => {
            println!(
                "{pending} item(s) unlock once lesson {} is complete",
                view.lesson_id
            );
        }
        MaterialAccess::Empty => println!("No materials for this lesson"),
        MaterialAccess::Unlocked => {}
    }
    if let Some(materials) = view.visible_materials() {
        print_materials(materials);
    }
}

fn print_materials(materials: &LessonMaterials) {
    for assignment in &materials.assignments {
        let status = match assignment.status() {
            SubmissionStatus::NotSubmitted => "not submitted".to_owned(),
            SubmissionStatus::PendingReview => "awaiting grade".to_owned(),
            SubmissionStatus::Graded { score, max } => format!("graded {score}/{max}"),
        };
        println!("assignment {}: {} ({status})", assignment.id, assignment.title);
    }
    for quiz in &materials.quizzes {
        let best = quiz
            .best_attempt()
            .and_then(|a| a.score)
            .map_or_else(|| "no attempts".to_owned(), |s| format!("best {s}%"));
        println!(
            "quiz {}: {} ({} questions, pass at {}%, {best})",
            quiz.id,
            quiz.title,
            quiz.questions.len(),
            quiz.passing_score
        );
    }
}

fn print_analytics(analytics: &EnrollmentAnalytics) {
    match analytics.range {
        Some((start, end)) => println!("{start} to {end}"),
        None => println!("No enrollments in this window"),
    }
    for day in &analytics.days {
        println!("{}  {:>5}", day.date, day.count);
    }
    println!(
        "total {}, {:.1} per day",
        analytics.total_enrollments, analytics.average_per_day
    );
    if let Some(peak) = analytics.peak() {
        println!("busiest day {} ({})", peak.date, peak.count);
    }
}
